//! Status-line and body formatting shared by the Google adapters.

use reqwest::StatusCode;
use serde::Deserialize;

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Google's JSON error envelope: `{"error": {"code": 401, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    #[serde(default)]
    message: String,
}

/// Coarse classification of a non-success status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusClass {
    Unauthorized,
    Timeout,
    Rejected,
}

impl StatusClass {
    pub(crate) const fn of(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Self::Timeout,
            _ => Self::Rejected,
        }
    }
}

/// `status <code>` followed by the service's error message, or a compact
/// preview of the raw body when it is not a Google error envelope.
pub(crate) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let detail = google_error_message(body).unwrap_or_else(|| body_preview(body));
    if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {detail}", status.as_u16())
    }
}

fn google_error_message(body: &[u8]) -> Option<String> {
    let envelope: GoogleErrorEnvelope = serde_json::from_slice(body).ok()?;
    let preview = body_preview(envelope.error.message.as_bytes());
    (!preview.is_empty()).then_some(preview)
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
