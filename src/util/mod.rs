//! Shared utilities for `maestro_allure`.
//!
//! - Document and history identifiers (UUIDv4 / UUIDv5)
//! - Start-time anchor parsing
//! - Progress indicators for batch runs

pub mod id;
pub mod progress;
pub mod time;

pub use id::{history_key, history_seed, matrix_discriminator, new_document_id};
pub use time::{now_epoch_ms, parse_start_time, parse_start_time_ms};
