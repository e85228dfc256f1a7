//! Google Sheets outbound adapter.
//!
//! This module provides a thin HTTP implementation of the `SheetLog` port.

mod dto;
mod http_log;

pub use http_log::{DEFAULT_SHEETS_ENDPOINT, SheetsHttpLog};
