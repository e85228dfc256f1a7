//! Bearer credential issued by the OAuth2 token endpoint.
//!
//! The token lives in process memory only. It is zeroized on drop and never
//! rendered by `Debug`.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use zeroize::Zeroizing;

/// Seconds before the issuer's expiry at which a credential stops being used.
const EXPIRY_SKEW_SECONDS: i64 = 30;

/// Domain error returned when a credential cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Access token was blank once trimmed.
    EmptyToken,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyToken => write!(f, "access token must not be empty"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Opaque bearer token with an issuer-controlled expiry.
///
/// ## Invariants
/// - `access_token` is non-blank.
/// - A credential whose expiry (minus a small skew) has passed is treated as
///   absent by the authorizer.
///
/// # Examples
/// ```
/// use chrono::{TimeDelta, Utc};
/// use food_tracker::domain::Credential;
///
/// let now = Utc::now();
/// let credential = Credential::new("ya29.token", Some(now + TimeDelta::hours(1))).unwrap();
/// assert_eq!(credential.access_token(), "ya29.token");
/// assert!(!credential.is_expired(now));
/// assert_eq!(format!("{credential:?}"), "Credential { access_token: \"[REDACTED]\", .. }");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: Zeroizing<String>,
    expires_at: Option<DateTime<Utc>>,
    scopes: Vec<String>,
}

impl Credential {
    /// Construct a credential from an issued access token.
    pub fn new(
        access_token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Self, CredentialValidationError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(CredentialValidationError::EmptyToken);
        }
        Ok(Self {
            access_token: Zeroizing::new(access_token),
            expires_at,
            scopes: Vec::new(),
        })
    }

    /// Record the scopes the issuer actually granted.
    #[must_use]
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = String>) -> Self {
        self.scopes = scopes.into_iter().collect();
        self
    }

    /// Token value for the `Authorization: Bearer` header.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Issuer-reported expiry, if any.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Scopes granted with this token.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Whether the credential should no longer be presented at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now >= expires_at - TimeDelta::seconds(EXPIRY_SKEW_SECONDS))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
