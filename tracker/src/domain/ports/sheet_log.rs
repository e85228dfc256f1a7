//! Driven port for appending rows to the meal spreadsheet.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::Credential;

/// How the spreadsheet interprets appended values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Parse values as if typed into the UI (dates, numbers, formulas).
    UserEntered,
}

impl ValueInputOption {
    /// Wire value of the `valueInputOption` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

/// One append-to-range call carrying a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendRowRequest {
    /// Target spreadsheet.
    pub spreadsheet_id: String,
    /// A1 range the table lives in, e.g. `Sheet1!A:E`.
    pub range: String,
    /// Value interpretation mode.
    pub value_input: ValueInputOption,
    /// Cell values, left to right.
    pub values: Vec<String>,
}

/// Range the spreadsheet reported as updated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppendedRange {
    /// Echoed A1 range, when the service returned one.
    pub updated_range: Option<String>,
}

define_port_error! {
    /// Errors surfaced while appending a row.
    pub enum SheetLogError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "sheet append transport failed: {message}",
        /// The call exceeded the client timeout.
        Timeout { message: String } =>
            "sheet append timed out: {message}",
        /// The spreadsheet service rejected the bearer credential.
        Unauthorized { message: String } =>
            "sheet append unauthorized: {message}",
        /// The service answered with a non-success status.
        Rejected { message: String } =>
            "sheet append rejected: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "sheet append response invalid: {message}",
        /// The adapter could not build the request.
        InvalidRequest { message: String } =>
            "sheet append request invalid: {message}",
    }
}

impl SheetLogError {
    /// Whether the failure means the credential must be renewed.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Port for the spreadsheet append endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetLog: Send + Sync {
    /// Append one row after the last row of the range's table.
    ///
    /// # Errors
    ///
    /// Returns [`SheetLogError`] on transport failure or non-success status.
    async fn append_row(
        &self,
        credential: &Credential,
        request: &AppendRowRequest,
    ) -> Result<AppendedRange, SheetLogError>;
}
