//! Meal logging against Google Drive and Google Sheets.
//!
//! The [`domain`] owns the authorization state machine and the
//! validate/upload/append sequence; [`outbound`] adapters speak Google's HTTP
//! APIs; [`inbound`] renders everything in a terminal.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(test)]
mod test_support;
