//! Reqwest-backed consent flow using a loopback redirect.
//!
//! Each call starts a fresh listener on `127.0.0.1` and hands the consent URL
//! to a [`ConsentUrlSink`]. Once the redirect arrives the listener is stopped,
//! `state` is checked and the code is exchanged with the PKCE verifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::dto::{CodeExchangeForm, TokenErrorDto, TokenResponseDto};
use super::pkce::{CHALLENGE_METHOD, PkcePair};
use super::redirect::{RedirectListener, RedirectParams};
use crate::domain::Credential;
use crate::domain::ports::{ConsentFlow, ConsentFlowError, ConsentRequest};
use crate::outbound::http_errors::{StatusClass, status_message};

/// Google's OAuth2 authorization endpoint.
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google's OAuth2 token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

const ACCESS_DENIED: &str = "access_denied";

/// Receives the consent page URL the user has to open.
pub trait ConsentUrlSink: Send + Sync {
    /// Show or open `consent_url`. Called once per consent attempt.
    fn present(&self, consent_url: &Url);
}

/// Issuer endpoints, client secret and waits for [`LoopbackConsentFlow`].
pub struct LoopbackConsentSettings {
    /// OAuth client secret of the installed-app client.
    pub client_secret: Zeroizing<String>,
    /// Authorization (consent page) endpoint.
    pub auth_endpoint: Url,
    /// Code exchange endpoint.
    pub token_endpoint: Url,
    /// Loopback port; `0` picks a free port per attempt.
    pub redirect_port: u16,
    /// How long to wait for the user to finish consent.
    pub consent_timeout: Duration,
    /// Timeout for the token exchange request.
    pub request_timeout: Duration,
}

/// Consent flow for installed applications.
pub struct LoopbackConsentFlow {
    client: Client,
    client_secret: Zeroizing<String>,
    auth_endpoint: Url,
    token_endpoint: Url,
    redirect_port: u16,
    consent_timeout: Duration,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ConsentUrlSink>,
}

impl LoopbackConsentFlow {
    /// Build the flow with a reqwest client for the token exchange.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        settings: LoopbackConsentSettings,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn ConsentUrlSink>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.request_timeout).build()?;
        Ok(Self {
            client,
            client_secret: settings.client_secret,
            auth_endpoint: settings.auth_endpoint,
            token_endpoint: settings.token_endpoint,
            redirect_port: settings.redirect_port,
            consent_timeout: settings.consent_timeout,
            clock,
            sink,
        })
    }

    fn consent_url(&self, request: &ConsentRequest, redirect_uri: &str, pkce: &PkcePair) -> Url {
        let mut url = self.auth_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &request.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &request.scopes.join(" "))
            .append_pair("prompt", request.prompt.as_str())
            .append_pair("state", &request.state)
            .append_pair("code_challenge", pkce.challenge())
            .append_pair("code_challenge_method", CHALLENGE_METHOD);
        url
    }

    async fn wait_for_redirect(
        &self,
        listener: &mut RedirectListener,
    ) -> Result<RedirectParams, ConsentFlowError> {
        tokio::time::timeout(self.consent_timeout, listener.next_redirect())
            .await
            .map_err(|_| {
                ConsentFlowError::timeout(format!(
                    "no sign-in redirect within {}s",
                    self.consent_timeout.as_secs()
                ))
            })?
            .map_err(|error| ConsentFlowError::transport(format!("loopback listener: {error}")))
    }

    async fn exchange_code(
        &self,
        request: &ConsentRequest,
        code: &str,
        redirect_uri: &str,
        pkce: &PkcePair,
    ) -> Result<Credential, ConsentFlowError> {
        let form = CodeExchangeForm {
            grant_type: "authorization_code",
            code,
            redirect_uri,
            client_id: &request.client_id,
            client_secret: &self.client_secret,
            code_verifier: pkce.verifier(),
        };
        let response = self
            .client
            .post(self.token_endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_token_error(status, body.as_ref()));
        }

        let token: TokenResponseDto = serde_json::from_slice(body.as_ref()).map_err(|error| {
            ConsentFlowError::invalid_response(format!("invalid token response: {error}"))
        })?;
        self.credential_from(token, request)
    }

    fn credential_from(
        &self,
        token: TokenResponseDto,
        request: &ConsentRequest,
    ) -> Result<Credential, ConsentFlowError> {
        match token.token_type.as_deref() {
            Some(kind) if !kind.eq_ignore_ascii_case("bearer") => {
                return Err(ConsentFlowError::invalid_response(format!(
                    "unsupported token type {kind:?}"
                )));
            }
            _ => {}
        }

        let now = self.clock.utc();
        let expires_at = token
            .expires_in
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl));
        let scopes = token.scope.as_deref().map_or_else(
            || request.scopes.clone(),
            |granted| granted.split_whitespace().map(str::to_owned).collect(),
        );
        Credential::new(token.access_token, expires_at)
            .map(|credential| credential.with_scopes(scopes))
            .map_err(|error| ConsentFlowError::invalid_response(error.to_string()))
    }
}

#[async_trait]
impl ConsentFlow for LoopbackConsentFlow {
    async fn request_token(
        &self,
        request: &ConsentRequest,
    ) -> Result<Credential, ConsentFlowError> {
        let mut listener = RedirectListener::bind(self.redirect_port).map_err(|error| {
            ConsentFlowError::transport(format!("cannot bind loopback listener: {error}"))
        })?;
        let port = listener.port();
        let redirect_uri = format!("http://127.0.0.1:{port}/");
        let pkce = PkcePair::generate();

        self.sink.present(&self.consent_url(request, &redirect_uri, &pkce));
        info!(port, "waiting for the sign-in redirect");
        let params = self.wait_for_redirect(&mut listener).await;
        listener.stop().await;

        let code = authorization_code(params?, &request.state)?;
        debug!("exchanging authorization code");
        self.exchange_code(request, &code, &redirect_uri, &pkce).await
    }
}

fn authorization_code(
    params: RedirectParams,
    expected_state: &str,
) -> Result<String, ConsentFlowError> {
    if params.state.as_deref() != Some(expected_state) {
        return Err(ConsentFlowError::invalid_response(
            "redirect state did not match the consent request",
        ));
    }
    if let Some(error) = params.error {
        let message = params
            .error_description
            .map_or_else(|| error.clone(), |description| format!("{error}: {description}"));
        return Err(if error == ACCESS_DENIED {
            ConsentFlowError::denied(message)
        } else {
            ConsentFlowError::issuer(message)
        });
    }
    params
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| {
            ConsentFlowError::invalid_response("redirect did not carry an authorization code")
        })
}

fn map_transport_error(error: reqwest::Error) -> ConsentFlowError {
    if error.is_timeout() {
        ConsentFlowError::timeout(error.to_string())
    } else {
        ConsentFlowError::transport(error.to_string())
    }
}

fn map_token_error(status: StatusCode, body: &[u8]) -> ConsentFlowError {
    if StatusClass::of(status) == StatusClass::Timeout {
        return ConsentFlowError::timeout(status_message(status, body));
    }
    let message = serde_json::from_slice::<TokenErrorDto>(body).map_or_else(
        |_| status_message(status, body),
        |token_error| token_error.describe(),
    );
    ConsentFlowError::issuer(message)
}
