// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Givesync.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Top-level Givesync configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GivesyncConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Source (donor platform) API settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Ledger (accounting platform) API settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Sync engine settings.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Inbound webhook settings.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "givesync.db".to_string()
}

/// Source API configuration (HTTP Basic auth).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Base URL of the Source API.
    #[serde(default = "default_source_base_url")]
    pub base_url: String,

    /// Application id for Basic auth. `None` disables the source gateway.
    #[serde(default)]
    pub app_id: Option<String>,

    /// Application secret for Basic auth.
    #[serde(default)]
    pub secret: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_source_base_url(),
            app_id: None,
            secret: None,
        }
    }
}

fn default_source_base_url() -> String {
    "https://api.donorplatform.example/v2".to_string()
}

/// Ledger API configuration (OAuth2 bearer).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Base URL of the Ledger API.
    #[serde(default = "default_ledger_base_url")]
    pub base_url: String,

    /// OAuth2 token endpoint of the identity provider.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// OAuth2 client id.
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth2 client secret.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Ledger company (realm) identifier.
    #[serde(default)]
    pub realm_id: String,

    /// Name of the bank account deposits land in.
    #[serde(default = "default_bank_account")]
    pub bank_account_name: String,

    /// Name of the income account gross donation lines post to.
    #[serde(default = "default_income_account")]
    pub income_account_name: String,

    /// Name of the expense account processing-fee lines post to.
    #[serde(default = "default_fee_account")]
    pub fee_account_name: String,

    /// Name of the expense account registration refunds post to.
    #[serde(default = "default_refund_account")]
    pub refund_account_name: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_url: default_ledger_base_url(),
            token_url: default_token_url(),
            client_id: None,
            client_secret: None,
            realm_id: String::new(),
            bank_account_name: default_bank_account(),
            income_account_name: default_income_account(),
            fee_account_name: default_fee_account(),
            refund_account_name: default_refund_account(),
        }
    }
}

fn default_ledger_base_url() -> String {
    "https://api.ledger.example/v3".to_string()
}

fn default_token_url() -> String {
    "https://oauth.ledger.example/token".to_string()
}

fn default_bank_account() -> String {
    "Checking".to_string()
}

fn default_income_account() -> String {
    "Donations Income".to_string()
}

fn default_fee_account() -> String {
    "Merchant Fees".to_string()
}

fn default_refund_account() -> String {
    "Registration Refunds".to_string()
}

/// Sync engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Default backfill window in days when resetting a watermark.
    #[serde(default = "default_backfill_days")]
    pub default_backfill_days: u32,

    /// Upper clamp for operator-requested backfill windows.
    #[serde(default = "default_max_backfill_days")]
    pub max_backfill_days: u32,

    /// Run-lock lease TTL in seconds.
    #[serde(default = "default_lock_ttl_secs")]
    pub lock_ttl_secs: u32,

    /// Bearer token granting operator access to trigger endpoints.
    #[serde(default)]
    pub operator_token: Option<String>,

    /// Pre-shared secrets accepted on trigger endpoints (`webhook_secret`).
    #[serde(default)]
    pub trigger_secrets: Vec<String>,

    /// URL invoked with the run summary on `partial`/`error` outcomes.
    #[serde(default)]
    pub notify_url: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_backfill_days: default_backfill_days(),
            max_backfill_days: default_max_backfill_days(),
            lock_ttl_secs: default_lock_ttl_secs(),
            operator_token: None,
            trigger_secrets: Vec::new(),
            notify_url: None,
        }
    }
}

fn default_backfill_days() -> u32 {
    7
}

fn default_max_backfill_days() -> u32 {
    90
}

fn default_lock_ttl_secs() -> u32 {
    900
}

/// Inbound webhook configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// HMAC-SHA256 shared secret per event type.
    #[serde(default)]
    pub secrets: HashMap<String, String>,
}
