// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./givesync.toml` > `~/.config/givesync/givesync.toml`
//! > `/etc/givesync/givesync.toml` with environment variable overrides via the
//! `GIVESYNC_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::GivesyncConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/givesync/givesync.toml` (system-wide)
/// 3. `~/.config/givesync/givesync.toml` (user XDG config)
/// 4. `./givesync.toml` (local directory)
/// 5. `GIVESYNC_*` environment variables
pub fn load_config() -> Result<GivesyncConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GivesyncConfig::default()))
        .merge(Toml::file("/etc/givesync/givesync.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("givesync/givesync.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("givesync.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<GivesyncConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GivesyncConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GivesyncConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GivesyncConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `GIVESYNC_LEDGER_CLIENT_ID`
/// must map to `ledger.client_id`, not `ledger.client.id`.
fn env_provider() -> Env {
    Env::prefixed("GIVESYNC_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: GIVESYNC_SOURCE_APP_ID -> "source_app_id"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("source_", "source.", 1)
            .replacen("ledger_", "ledger.", 1)
            .replacen("sync_", "sync.", 1)
            .replacen("webhook_", "webhook.", 1);
        mapped.into()
    })
}
