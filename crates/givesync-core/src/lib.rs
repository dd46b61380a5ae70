// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Givesync reconciliation engine.
//!
//! This crate provides the shared error type and the domain vocabulary used
//! throughout the Givesync workspace: raw upstream records, category
//! mappings, sync kinds, and run statuses.

pub mod error;
pub mod types;

pub use error::{ErrorKind, SyncError};
pub use types::{
    Allocation, CategoryMapping, PaymentInstrument, RawRecord, RunStatus, SyncKind, format_minor,
};
