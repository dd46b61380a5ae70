// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run context: the explicitly constructed handles a run operates on.
//!
//! Handles are passed down, never reached through globals, so tests can
//! substitute fakes (mock HTTP servers, temp databases).

use std::sync::Arc;

use givesync_config::GivesyncConfig;
use givesync_ledger::LedgerClient;
use givesync_source::SourceClient;
use givesync_storage::Database;

/// Everything one orchestrator run needs.
///
/// The ledger client is rebuilt per run so its name-lookup cache lives for
/// exactly one orchestrator pass.
pub struct RunContext {
    pub db: Database,
    pub source: SourceClient,
    pub ledger: Arc<LedgerClient>,
    pub config: GivesyncConfig,
}
