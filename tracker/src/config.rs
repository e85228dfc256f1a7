//! Google API settings loaded via OrthoConfig.
//!
//! `GoogleSettings` is the raw layer read from `GOOGLE_*` environment
//! variables. `TrackerConfig` is the validated form the binary wires adapters
//! from.

use std::ffi::OsString;
use std::fmt;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{DEFAULT_SHEET_RANGE, SubmissionTarget};
use crate::outbound::drive::DEFAULT_DRIVE_UPLOAD_ENDPOINT;
use crate::outbound::oauth::{DEFAULT_AUTH_ENDPOINT, DEFAULT_TOKEN_ENDPOINT};
use crate::outbound::sheets::DEFAULT_SHEETS_ENDPOINT;

const PROGRAM_NAME: &str = "food-tracker";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONSENT_TIMEOUT_SECS: u64 = 300;

/// Raw settings read from the environment.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GOOGLE")]
pub struct GoogleSettings {
    /// OAuth client id of the installed-app client.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
    /// Browser API key, sent as `key=` on spreadsheet calls when present.
    pub api_key: Option<String>,
    /// Spreadsheet receiving meal rows.
    pub sheet_id: Option<String>,
    /// Drive folder receiving photos.
    pub folder_id: Option<String>,
    /// A1 range of the meal table.
    pub sheet_range: Option<String>,
    /// Drive multipart upload endpoint override.
    pub upload_endpoint: Option<String>,
    /// Sheets API root override.
    pub sheets_endpoint: Option<String>,
    /// OAuth authorization endpoint override.
    pub auth_endpoint: Option<String>,
    /// OAuth token endpoint override.
    pub token_endpoint: Option<String>,
    /// Fixed loopback port for the sign-in redirect.
    pub redirect_port: Option<u16>,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// How long to wait for the user to finish signing in, in seconds.
    pub consent_timeout_secs: Option<u64>,
}

impl GoogleSettings {
    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from(PROGRAM_NAME)])
            .map_err(|error| ConfigError::Load(error.to_string()))
    }

    /// Log which required settings are present, never their values.
    pub fn log_presence(&self) {
        debug!(
            client_id = present(self.client_id.as_deref()),
            client_secret = present(self.client_secret.as_deref()),
            api_key = present(self.api_key.as_deref()),
            sheet_id = present(self.sheet_id.as_deref()),
            folder_id = present(self.folder_id.as_deref()),
            "google settings loaded"
        );
    }
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|raw| !raw.trim().is_empty())
}

/// Configuration failures surfaced at start-up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The configuration layer could not be read.
    #[error("failed to load configuration: {0}")]
    Load(String),
    /// A required variable is unset or blank.
    #[error("{key} must be set")]
    Missing {
        /// Environment variable name.
        key: &'static str,
    },
    /// An endpoint override is not an absolute URL.
    #[error("{key} is not a valid URL: {reason}")]
    InvalidEndpoint {
        /// Environment variable name.
        key: &'static str,
        /// Parser message.
        reason: String,
    },
    /// A timeout was configured as zero seconds.
    #[error("{key} must be greater than zero")]
    ZeroTimeout {
        /// Environment variable name.
        key: &'static str,
    },
}

/// Endpoints of the three Google services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    /// Drive multipart upload.
    pub upload: Url,
    /// Sheets API root.
    pub sheets: Url,
    /// OAuth consent page.
    pub auth: Url,
    /// OAuth code exchange.
    pub token: Url,
}

/// Validated configuration.
#[derive(Clone)]
pub struct TrackerConfig {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: Zeroizing<String>,
    /// Optional API key for spreadsheet calls.
    pub api_key: Option<Zeroizing<String>>,
    /// Folder, spreadsheet and range written to.
    pub target: SubmissionTarget,
    /// Service endpoints.
    pub endpoints: GoogleEndpoints,
    /// Loopback redirect port; `0` picks a free port.
    pub redirect_port: u16,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Sign-in wait limit.
    pub consent_timeout: Duration,
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("target", &self.target)
            .field("endpoints", &self.endpoints)
            .field("redirect_port", &self.redirect_port)
            .field("request_timeout", &self.request_timeout)
            .field("consent_timeout", &self.consent_timeout)
            .finish()
    }
}

impl TrackerConfig {
    /// Load and validate settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is missing or malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = GoogleSettings::from_env()?;
        settings.log_presence();
        Self::from_settings(settings)
    }

    /// Validate raw settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required value is missing or blank, an
    /// endpoint does not parse, or a timeout is zero.
    pub fn from_settings(settings: GoogleSettings) -> Result<Self, ConfigError> {
        let client_id = required("GOOGLE_CLIENT_ID", settings.client_id)?;
        let client_secret = Zeroizing::new(required(
            "GOOGLE_CLIENT_SECRET",
            settings.client_secret,
        )?);
        let target = SubmissionTarget {
            folder_id: required("GOOGLE_FOLDER_ID", settings.folder_id)?,
            spreadsheet_id: required("GOOGLE_SHEET_ID", settings.sheet_id)?,
            sheet_range: optional(settings.sheet_range)
                .unwrap_or_else(|| DEFAULT_SHEET_RANGE.to_owned()),
        };
        let endpoints = GoogleEndpoints {
            upload: endpoint(
                "GOOGLE_UPLOAD_ENDPOINT",
                settings.upload_endpoint,
                DEFAULT_DRIVE_UPLOAD_ENDPOINT,
            )?,
            sheets: endpoint(
                "GOOGLE_SHEETS_ENDPOINT",
                settings.sheets_endpoint,
                DEFAULT_SHEETS_ENDPOINT,
            )?,
            auth: endpoint(
                "GOOGLE_AUTH_ENDPOINT",
                settings.auth_endpoint,
                DEFAULT_AUTH_ENDPOINT,
            )?,
            token: endpoint(
                "GOOGLE_TOKEN_ENDPOINT",
                settings.token_endpoint,
                DEFAULT_TOKEN_ENDPOINT,
            )?,
        };

        Ok(Self {
            client_id,
            client_secret,
            api_key: optional(settings.api_key).map(Zeroizing::new),
            target,
            endpoints,
            redirect_port: settings.redirect_port.unwrap_or(0),
            request_timeout: timeout(
                "GOOGLE_REQUEST_TIMEOUT_SECS",
                settings.request_timeout_secs,
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            consent_timeout: timeout(
                "GOOGLE_CONSENT_TIMEOUT_SECS",
                settings.consent_timeout_secs,
                DEFAULT_CONSENT_TIMEOUT_SECS,
            )?,
        })
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

fn required(key: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    optional(value).ok_or(ConfigError::Missing { key })
}

fn endpoint(
    key: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<Url, ConfigError> {
    let raw = optional(value).unwrap_or_else(|| default.to_owned());
    let url = Url::parse(&raw).map_err(|error| ConfigError::InvalidEndpoint {
        key,
        reason: error.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEndpoint {
            key,
            reason: "URL cannot carry a path".to_owned(),
        });
    }
    Ok(url)
}

fn timeout(key: &'static str, value: Option<u64>, default: u64) -> Result<Duration, ConfigError> {
    match value.unwrap_or(default) {
        0 => Err(ConfigError::ZeroTimeout { key }),
        seconds => Ok(Duration::from_secs(seconds)),
    }
}
