//! OAuth2 consent adapter for Google's token issuer.
//!
//! Runs the authorization-code flow for installed applications: the consent
//! page opens in the user's browser, the issuer redirects to a one-shot
//! loopback listener, and the code is exchanged for a bearer token with a
//! PKCE verifier.

mod dto;
mod loopback_consent;
mod pkce;
mod redirect;

pub use loopback_consent::{
    ConsentUrlSink, DEFAULT_AUTH_ENDPOINT, DEFAULT_TOKEN_ENDPOINT, LoopbackConsentFlow,
    LoopbackConsentSettings,
};
