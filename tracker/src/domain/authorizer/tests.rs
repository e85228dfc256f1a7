//! Unit tests for the authorization state machine.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{
    AuthorizationError, AuthorizationState, Authorizer, DRIVE_FILE_SCOPE, SPREADSHEETS_SCOPE,
};
use crate::domain::Credential;
use crate::domain::ports::{
    ConsentFlow, ConsentFlowError, ConsentPrompt, ConsentRequest, MockConsentFlow,
};
use crate::test_support::{MutableClock, hour_long_credential};

fn authorizer_with(consent: MockConsentFlow, clock: Arc<MutableClock>) -> Authorizer {
    Authorizer::new(Arc::new(consent), clock, "client-123")
}

fn expect_grant(mock: &mut MockConsentFlow, times: usize) {
    mock.expect_request_token()
        .withf(|request: &ConsentRequest| {
            request.client_id == "client-123"
                && request.prompt == ConsentPrompt::Consent
                && request.scopes == [SPREADSHEETS_SCOPE, DRIVE_FILE_SCOPE]
                && !request.state.is_empty()
        })
        .times(times)
        .returning(|_| Ok(hour_long_credential("ya29.granted")));
}

/// Consent flow that parks until the test releases it.
#[derive(Default)]
struct GatedConsent {
    release: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl ConsentFlow for GatedConsent {
    async fn request_token(
        &self,
        _request: &ConsentRequest,
    ) -> Result<Credential, ConsentFlowError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(hour_long_credential("ya29.gated"))
    }
}

#[test]
fn starts_unauthenticated() {
    let authorizer = authorizer_with(
        MockConsentFlow::new(),
        Arc::new(MutableClock::new_year_breakfast()),
    );

    assert_eq!(authorizer.state(), AuthorizationState::Unauthenticated);
    assert!(authorizer.current_credential().is_none());
    assert!(!authorizer.is_authorized());
}

#[tokio::test]
async fn successful_consent_authorizes_and_is_reused() {
    let mut consent = MockConsentFlow::new();
    expect_grant(&mut consent, 1);
    let authorizer = authorizer_with(consent, Arc::new(MutableClock::new_year_breakfast()));

    let first = authorizer
        .ensure_authorized()
        .await
        .expect("consent should succeed");
    let second = authorizer
        .ensure_authorized()
        .await
        .expect("held credential should be returned");

    assert_eq!(first.access_token(), "ya29.granted");
    assert_eq!(first, second);
    assert!(authorizer.is_authorized());
    assert_eq!(
        authorizer.current_credential().map(|c| c.access_token().to_owned()),
        Some("ya29.granted".to_owned())
    );
}

#[tokio::test]
async fn denied_consent_leaves_authorizer_unauthenticated() {
    let mut consent = MockConsentFlow::new();
    consent
        .expect_request_token()
        .times(1)
        .returning(|_| Err(ConsentFlowError::denied("access_denied")));
    let authorizer = authorizer_with(consent, Arc::new(MutableClock::new_year_breakfast()));

    let error = authorizer
        .ensure_authorized()
        .await
        .expect_err("denied consent must fail");

    assert_eq!(
        error,
        AuthorizationError::Consent(ConsentFlowError::denied("access_denied"))
    );
    assert_eq!(authorizer.state(), AuthorizationState::Unauthenticated);
}

#[tokio::test]
async fn consent_can_be_retried_after_failure() {
    let mut consent = MockConsentFlow::new();
    let mut seq = mockall::Sequence::new();
    consent
        .expect_request_token()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(ConsentFlowError::issuer("invalid_client")));
    consent
        .expect_request_token()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(hour_long_credential("ya29.retry")));
    let authorizer = authorizer_with(consent, Arc::new(MutableClock::new_year_breakfast()));

    assert!(authorizer.ensure_authorized().await.is_err());
    let credential = authorizer
        .ensure_authorized()
        .await
        .expect("second consent should succeed");

    assert_eq!(credential.access_token(), "ya29.retry");
}

#[tokio::test]
async fn expired_credential_triggers_fresh_consent() {
    let mut consent = MockConsentFlow::new();
    expect_grant(&mut consent, 2);
    let clock = Arc::new(MutableClock::new_year_breakfast());
    let authorizer = authorizer_with(consent, clock.clone());

    authorizer
        .ensure_authorized()
        .await
        .expect("first consent should succeed");
    clock.advance_seconds(3_600);

    assert!(authorizer.current_credential().is_none());
    authorizer
        .ensure_authorized()
        .await
        .expect("renewal consent should succeed");
}

#[tokio::test]
async fn invalidate_drops_the_credential() {
    let mut consent = MockConsentFlow::new();
    expect_grant(&mut consent, 1);
    let authorizer = authorizer_with(consent, Arc::new(MutableClock::new_year_breakfast()));
    authorizer
        .ensure_authorized()
        .await
        .expect("consent should succeed");

    authorizer.invalidate();

    assert_eq!(authorizer.state(), AuthorizationState::Unauthenticated);
    assert!(authorizer.current_credential().is_none());
}

#[tokio::test]
async fn second_consent_while_pending_is_refused() {
    let gate = Arc::new(GatedConsent::default());
    let authorizer = Authorizer::new(
        gate.clone(),
        Arc::new(MutableClock::new_year_breakfast()),
        "client-123",
    );

    let first = authorizer.ensure_authorized();
    tokio::pin!(first);
    assert!(
        tokio::time::timeout(Duration::from_millis(20), &mut first)
            .await
            .is_err(),
        "first consent should still be waiting on the user"
    );
    assert_eq!(authorizer.state(), AuthorizationState::ConsentPending);

    let second = authorizer.ensure_authorized().await;
    assert_eq!(second, Err(AuthorizationError::ConsentInProgress));

    gate.release.notify_one();
    let credential = first.await.expect("released consent should succeed");
    assert_eq!(credential.access_token(), "ya29.gated");
    assert_eq!(gate.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dropping_a_pending_consent_resets_the_state() {
    let gate = Arc::new(GatedConsent::default());
    let authorizer = Authorizer::new(
        gate.clone(),
        Arc::new(MutableClock::new_year_breakfast()),
        "client-123",
    );

    {
        let pending = authorizer.ensure_authorized();
        tokio::pin!(pending);
        assert!(
            tokio::time::timeout(Duration::from_millis(20), &mut pending)
                .await
                .is_err()
        );
        assert_eq!(authorizer.state(), AuthorizationState::ConsentPending);
    }

    assert_eq!(authorizer.state(), AuthorizationState::Unauthenticated);
}
