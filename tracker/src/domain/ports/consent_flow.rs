//! Driven port for the interactive OAuth2 consent step.
//!
//! The consent step needs off-process user interaction (a browser window), so
//! the domain only sees a single-shot asynchronous call that resolves to a
//! credential or an error. Dropping the returned future abandons the flow.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::Credential;

/// Consent prompt mode sent to the token issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentPrompt {
    /// Always show the consent screen, even for previously granted scopes.
    Consent,
}

impl ConsentPrompt {
    /// Wire value of the `prompt` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Consent => "consent",
        }
    }
}

/// Domain-owned token request passed to the consent adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentRequest {
    /// OAuth client identifier.
    pub client_id: String,
    /// Scopes requested from the issuer.
    pub scopes: Vec<String>,
    /// Prompt mode.
    pub prompt: ConsentPrompt,
    /// Opaque anti-forgery value the issuer must echo back.
    pub state: String,
}

define_port_error! {
    /// Errors surfaced while obtaining a credential.
    pub enum ConsentFlowError {
        /// The user declined the consent screen.
        Denied { message: String } =>
            "consent denied: {message}",
        /// The issuer answered with an OAuth error.
        Issuer { message: String } =>
            "token issuer error: {message}",
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "consent transport failed: {message}",
        /// The user did not complete consent in time.
        Timeout { message: String } =>
            "consent timed out: {message}",
        /// The redirect or token response could not be understood.
        InvalidResponse { message: String } =>
            "consent response invalid: {message}",
    }
}

/// Port for running one interactive consent flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsentFlow: Send + Sync {
    /// Run consent and exchange the grant for a bearer credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConsentFlowError`] when the user declines, the issuer
    /// rejects the request, or the exchange fails in transit.
    async fn request_token(&self, request: &ConsentRequest)
    -> Result<Credential, ConsentFlowError>;
}
