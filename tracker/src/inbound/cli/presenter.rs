//! Terminal rendering of authorization and submission state.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use reqwest::Url;
use tracing::warn;

use crate::domain::{AuthorizationError, SubmissionOutcome};
use crate::outbound::oauth::ConsentUrlSink;

const SIGN_IN_FIRST: &str = "Please sign in with Google first";

/// Writes user-facing lines to a terminal stream.
///
/// Write failures are logged and otherwise ignored; presentation never
/// changes the outcome of a submission.
pub struct TerminalPresenter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> TerminalPresenter<W> {
    /// Present to `out`.
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the underlying stream.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Progress line shown while a submission runs.
    pub fn saving(&self) {
        self.line("Saving...");
    }

    /// Sign-in completed.
    pub fn signed_in(&self) {
        self.line("Signed in with Google.");
    }

    /// Sign-in failed; the user may try again.
    pub fn sign_in_failed(&self, error: &AuthorizationError) {
        self.line(&format!("Authentication failed. Please try again. ({error})"));
    }

    /// Prompt for one form field, showing the value kept from last time.
    pub fn field_prompt(&self, label: &str, current: &str) {
        let text = if current.is_empty() {
            format!("{label}: ")
        } else {
            format!("{label} [{current}]: ")
        };
        self.write(&text);
    }

    /// Free-form notice.
    pub fn notice(&self, text: &str) {
        self.line(text);
    }

    /// Banner for a finished submission.
    pub fn outcome(&self, outcome: &SubmissionOutcome) {
        let text = match outcome {
            SubmissionOutcome::Success(receipt) => receipt.updated_range.as_ref().map_or_else(
                || format!("Food entry added successfully! Photo: {}", receipt.photo_uri),
                |range| {
                    format!(
                        "Food entry added successfully! Photo: {} (row {range})",
                        receipt.photo_uri
                    )
                },
            ),
            SubmissionOutcome::NotAuthorized(_) => {
                format!("{SIGN_IN_FIRST}; you will be asked to sign in again.")
            }
            SubmissionOutcome::AppendFailed(error) => format!(
                "Error: {error}. The photo was uploaded but no row was added; the entry is kept so you can resubmit."
            ),
            SubmissionOutcome::ValidationFailed(_) | SubmissionOutcome::UploadFailed(_) => {
                format!(
                    "Error: {}",
                    outcome
                        .cause()
                        .unwrap_or_else(|| "Something went wrong".to_owned())
                )
            }
        };
        self.line(&text);
    }

    fn line(&self, text: &str) {
        self.write(&format!("{text}\n"));
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(error) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            warn!(error = %error, "terminal write failed");
        }
    }
}

impl<W: Write + Send> ConsentUrlSink for TerminalPresenter<W> {
    fn present(&self, consent_url: &Url) {
        self.line("Open this link in your browser to sign in with Google:");
        self.line(&format!("  {consent_url}"));
    }
}
