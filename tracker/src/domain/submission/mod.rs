//! Submission sequencing: validate, upload the photo, append the row.
//!
//! One call to [`SubmissionSequencer::submit`] is one end-to-end attempt. The
//! order is fixed; the spreadsheet row is only written once the photo upload
//! has been confirmed, so a row never points at a missing photo. Every failure
//! is folded into a [`SubmissionOutcome`]; nothing escapes as an error.
//!
//! An append failure after a successful upload leaves the photo in storage.
//! That object is not removed; the orphan is logged and the user may resubmit.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};
use url::Url;

use super::ports::{
    AppendRowRequest, AppendedRange, PhotoStore, PhotoStoreError, PhotoUploadRequest, SheetLog,
    SheetLogError, ValueInputOption,
};
use super::{Authorizer, MealDraft, MealDraftValidationError, MealEntry, PhotoFile};

/// Base of the shareable photo link; the object id goes in the `id` query.
pub const SHARE_URI_BASE: &str = "https://drive.google.com/uc";
/// Default table range rows are appended to.
pub const DEFAULT_SHEET_RANGE: &str = "Sheet1!A:E";

/// Where submissions are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTarget {
    /// Drive folder that receives photos.
    pub folder_id: String,
    /// Spreadsheet that receives rows.
    pub spreadsheet_id: String,
    /// A1 range of the meal table.
    pub sheet_range: String,
}

/// Driven ports used by the sequencer.
pub struct SubmissionPorts {
    /// Object storage for photos.
    pub photo_store: Arc<dyn PhotoStore>,
    /// Spreadsheet append endpoint.
    pub sheet_log: Arc<dyn SheetLog>,
}

/// Photo the store confirmed, with its derived shareable link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Store-assigned object id.
    pub remote_id: String,
    /// Stable link written to the spreadsheet.
    pub shareable_uri: Url,
}

/// What a successful submission wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Shareable link of the uploaded photo.
    pub photo_uri: Url,
    /// Range the spreadsheet reported as updated.
    pub updated_range: Option<String>,
}

/// Terminal result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Photo uploaded and row appended; the draft can be cleared.
    Success(SubmissionReceipt),
    /// Input rejected locally; nothing was sent.
    ValidationFailed(MealDraftValidationError),
    /// The photo upload failed; nothing was appended.
    UploadFailed(PhotoStoreError),
    /// The row append failed after the photo was uploaded.
    AppendFailed(SheetLogError),
    /// No usable credential; the user must consent again.
    NotAuthorized(Option<String>),
}

impl SubmissionOutcome {
    /// Whether the entry was saved.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Whether the presentation layer should prompt for consent.
    #[must_use]
    pub const fn requires_consent(&self) -> bool {
        matches!(self, Self::NotAuthorized(_))
    }

    /// Human-readable failure cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::ValidationFailed(reason) => Some(reason.to_string()),
            Self::UploadFailed(error) => Some(error.to_string()),
            Self::AppendFailed(error) => Some(error.to_string()),
            Self::NotAuthorized(cause) => cause.clone(),
        }
    }
}

/// Derive the shareable link for an uploaded object.
///
/// # Examples
/// ```
/// use food_tracker::domain::shareable_uri;
///
/// let uri = shareable_uri("abc123").unwrap();
/// assert_eq!(uri.as_str(), "https://drive.google.com/uc?id=abc123");
/// ```
///
/// # Errors
///
/// Returns a parse error only if [`SHARE_URI_BASE`] is malformed.
pub fn shareable_uri(remote_id: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(SHARE_URI_BASE, &[("id", remote_id)])
}

/// Runs one submission at a time against the photo store and sheet log.
///
/// `submit` takes `&mut self`, so a sequencer can never have two submissions
/// in flight.
pub struct SubmissionSequencer {
    authorizer: Arc<Authorizer>,
    photo_store: Arc<dyn PhotoStore>,
    sheet_log: Arc<dyn SheetLog>,
    clock: Arc<dyn Clock>,
    target: SubmissionTarget,
}

impl SubmissionSequencer {
    /// Wire a sequencer to its authorizer, ports and target.
    #[must_use]
    pub fn new(
        authorizer: Arc<Authorizer>,
        ports: SubmissionPorts,
        clock: Arc<dyn Clock>,
        target: SubmissionTarget,
    ) -> Self {
        let SubmissionPorts {
            photo_store,
            sheet_log,
        } = ports;
        Self {
            authorizer,
            photo_store,
            sheet_log,
            clock,
            target,
        }
    }

    /// Execute one submission attempt: validate, upload, append.
    ///
    /// No step is retried. A credential rejected by either endpoint clears the
    /// authorizer and yields [`SubmissionOutcome::NotAuthorized`].
    pub async fn submit(&mut self, draft: &MealDraft, photo: &PhotoFile) -> SubmissionOutcome {
        let Some(credential) = self.authorizer.current_credential() else {
            return SubmissionOutcome::NotAuthorized(Some(
                "Please sign in with Google first".to_owned(),
            ));
        };

        if let Err(reason) = draft.validate(photo) {
            info!(reason = %reason, "submission rejected before upload");
            return SubmissionOutcome::ValidationFailed(reason);
        }

        let captured_at = self.clock.utc();
        let upload_request = PhotoUploadRequest {
            name: photo.upload_name(captured_at),
            mime_type: photo.mime_type.clone(),
            parent_folder_id: self.target.folder_id.clone(),
            bytes: photo.bytes.clone(),
        };
        let upload = match self.upload(&credential, &upload_request).await {
            Ok(upload) => upload,
            Err(error) if error.is_unauthorized() => {
                self.authorizer.invalidate();
                return SubmissionOutcome::NotAuthorized(Some(error.to_string()));
            }
            Err(error) => {
                warn!(error = %error, kind = error.kind(), "photo upload failed");
                return SubmissionOutcome::UploadFailed(error);
            }
        };

        let entry = MealEntry::new(draft, captured_at, upload.shareable_uri.clone());
        let append_request = AppendRowRequest {
            spreadsheet_id: self.target.spreadsheet_id.clone(),
            range: self.target.sheet_range.clone(),
            value_input: ValueInputOption::UserEntered,
            values: entry.to_row(),
        };
        match self.sheet_log.append_row(&credential, &append_request).await {
            Ok(AppendedRange { updated_range }) => {
                info!(
                    photo_uri = %upload.shareable_uri,
                    updated_range = updated_range.as_deref().unwrap_or("unknown"),
                    "meal entry saved"
                );
                SubmissionOutcome::Success(SubmissionReceipt {
                    photo_uri: upload.shareable_uri,
                    updated_range,
                })
            }
            Err(error) => {
                warn!(
                    error = %error,
                    kind = error.kind(),
                    orphaned_photo = %upload.shareable_uri,
                    "row append failed after photo upload"
                );
                if error.is_unauthorized() {
                    self.authorizer.invalidate();
                    return SubmissionOutcome::NotAuthorized(Some(error.to_string()));
                }
                SubmissionOutcome::AppendFailed(error)
            }
        }
    }

    async fn upload(
        &self,
        credential: &super::Credential,
        request: &PhotoUploadRequest,
    ) -> Result<UploadResult, PhotoStoreError> {
        let stored = self.photo_store.upload(credential, request).await?;
        let shareable_uri = shareable_uri(&stored.remote_id).map_err(|error| {
            PhotoStoreError::decode(format!("cannot derive shareable link: {error}"))
        })?;
        info!(remote_id = %stored.remote_id, name = %request.name, "photo uploaded");
        Ok(UploadResult {
            remote_id: stored.remote_id,
            shareable_uri,
        })
    }
}
