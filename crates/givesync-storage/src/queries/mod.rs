// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per persisted entity.

pub mod idempotency;
pub mod locks;
pub mod mappings;
pub mod refunds;
pub mod retry_audit;
pub mod run_log;
pub mod settings;
pub mod tokens;
