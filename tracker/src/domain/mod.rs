//! Domain primitives, the authorization state machine and submission
//! sequencing.
//!
//! Purpose: keep the meal-logging rules independent of Google's HTTP APIs.
//! Driven adapters plug in through the traits in [`ports`].
//!
//! Public surface:
//! - `Credential`: in-memory bearer token with an optional expiry.
//! - `MealDraft`, `PhotoFile`, `MealEntry`: form state and the row written.
//! - `Authorizer`: owns the credential and runs consent.
//! - `SubmissionSequencer`: validate, upload, append, report.

pub mod authorizer;
pub mod credential;
pub mod meal_entry;
pub mod ports;
pub mod submission;

pub use self::authorizer::{
    AuthorizationError, AuthorizationState, Authorizer, DRIVE_FILE_SCOPE, SPREADSHEETS_SCOPE,
};
pub use self::credential::{Credential, CredentialValidationError};
pub use self::meal_entry::{
    MEAL_TIME_INPUT_FORMAT, MealDraft, MealDraftValidationError, MealEntry, PhotoFile,
    default_meal_time, format_meal_time_input, parse_meal_time,
};
pub use self::submission::{
    DEFAULT_SHEET_RANGE, SHARE_URI_BASE, SubmissionOutcome, SubmissionPorts, SubmissionReceipt,
    SubmissionSequencer, SubmissionTarget, UploadResult, shareable_uri,
};
