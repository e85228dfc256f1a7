//! Authorization state machine for the Drive and Sheets APIs.
//!
//! The authorizer owns the only copy of the bearer credential. Everything else
//! reads it through [`Authorizer::current_credential`]. States:
//!
//! - `Unauthenticated` (initial) moves to `ConsentPending` when a consent flow
//!   starts.
//! - `ConsentPending` moves to `Authorized` on success and back to
//!   `Unauthenticated` on failure or when the pending future is dropped.
//! - `Authorized` moves to `Unauthenticated` when a downstream call rejects
//!   the credential ([`Authorizer::invalidate`]) or the credential expires and
//!   the renewal consent fails.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use super::Credential;
use super::ports::{ConsentFlow, ConsentFlowError, ConsentPrompt, ConsentRequest};

/// Scope allowing files created by this app to be written to Drive.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";
/// Scope allowing spreadsheet writes.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Observable authorization state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationState {
    /// No usable credential.
    Unauthenticated,
    /// One interactive consent flow is in flight.
    ConsentPending,
    /// A credential is held.
    Authorized(Credential),
}

/// Failures of [`Authorizer::ensure_authorized`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    /// Another consent flow has not finished yet.
    #[error("a sign-in is already in progress")]
    ConsentInProgress,
    /// The consent flow failed or was declined.
    #[error("authorization failed: {0}")]
    Consent(#[from] ConsentFlowError),
}

/// Owner of the bearer credential.
pub struct Authorizer {
    consent: Arc<dyn ConsentFlow>,
    clock: Arc<dyn Clock>,
    client_id: String,
    scopes: Vec<String>,
    state: Mutex<AuthorizationState>,
}

impl Authorizer {
    /// Build an authorizer requesting the Drive file and Sheets scopes.
    #[must_use]
    pub fn new(
        consent: Arc<dyn ConsentFlow>,
        clock: Arc<dyn Clock>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            consent,
            clock,
            client_id: client_id.into(),
            scopes: vec![SPREADSHEETS_SCOPE.to_owned(), DRIVE_FILE_SCOPE.to_owned()],
            state: Mutex::new(AuthorizationState::Unauthenticated),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthorizationState {
        self.lock_state().clone()
    }

    /// Held credential, unless absent or expired.
    #[must_use]
    pub fn current_credential(&self) -> Option<Credential> {
        let now = self.clock.utc();
        match &*self.lock_state() {
            AuthorizationState::Authorized(credential) if !credential.is_expired(now) => {
                Some(credential.clone())
            }
            _ => None,
        }
    }

    /// Whether a usable credential is held.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.current_credential().is_some()
    }

    /// Drop the held credential after a downstream call rejected it.
    ///
    /// A pending consent flow is left alone; its outcome decides the state.
    pub fn invalidate(&self) {
        let mut state = self.lock_state();
        if matches!(*state, AuthorizationState::Authorized(_)) {
            warn!("credential rejected downstream; authorization cleared");
            *state = AuthorizationState::Unauthenticated;
        }
    }

    /// Return the held credential, or run one interactive consent flow.
    ///
    /// Consent is always requested with an explicit consent prompt. The
    /// returned future is single-shot; dropping it abandons the flow and
    /// resets the state to `Unauthenticated`.
    ///
    /// # Errors
    ///
    /// - [`AuthorizationError::ConsentInProgress`] when another flow is pending.
    /// - [`AuthorizationError::Consent`] when consent is declined or fails.
    pub async fn ensure_authorized(&self) -> Result<Credential, AuthorizationError> {
        let pending = {
            let now = self.clock.utc();
            let mut state = self.lock_state();
            let settled = match &*state {
                AuthorizationState::Authorized(credential) if !credential.is_expired(now) => {
                    Some(Ok(credential.clone()))
                }
                AuthorizationState::ConsentPending => {
                    Some(Err(AuthorizationError::ConsentInProgress))
                }
                AuthorizationState::Authorized(_) | AuthorizationState::Unauthenticated => None,
            };
            if let Some(result) = settled {
                return result;
            }
            *state = AuthorizationState::ConsentPending;
            PendingConsent::new(self)
        };

        let request = self.consent_request();
        match self.consent.request_token(&request).await {
            Ok(credential) => {
                info!(
                    scopes = credential.scopes().len(),
                    expires_at = ?credential.expires_at(),
                    "authorization granted"
                );
                pending.settle(AuthorizationState::Authorized(credential.clone()));
                Ok(credential)
            }
            Err(error) => {
                warn!(error = %error, kind = error.kind(), "authorization failed");
                pending.settle(AuthorizationState::Unauthenticated);
                Err(error.into())
            }
        }
    }

    fn consent_request(&self) -> ConsentRequest {
        ConsentRequest {
            client_id: self.client_id.clone(),
            scopes: self.scopes.clone(),
            prompt: ConsentPrompt::Consent,
            state: Uuid::new_v4().simple().to_string(),
        }
    }

    // Poisoning is ignored: every write replaces the whole state.
    fn lock_state(&self) -> MutexGuard<'_, AuthorizationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resets the authorizer if a consent future is dropped before settling.
struct PendingConsent<'a> {
    authorizer: &'a Authorizer,
    settled: bool,
}

impl<'a> PendingConsent<'a> {
    const fn new(authorizer: &'a Authorizer) -> Self {
        Self {
            authorizer,
            settled: false,
        }
    }

    fn settle(mut self, next: AuthorizationState) {
        *self.authorizer.lock_state() = next;
        self.settled = true;
    }
}

impl Drop for PendingConsent<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("consent flow abandoned before completion");
            *self.authorizer.lock_state() = AuthorizationState::Unauthenticated;
        }
    }
}

#[cfg(test)]
mod tests;
