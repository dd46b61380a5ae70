// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loading for the Givesync reconciliation engine.
//!
//! TOML files merged in XDG order with `GIVESYNC_*` environment overrides.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::GivesyncConfig;
