//! DTOs for the token endpoint.

use serde::{Deserialize, Serialize};

/// `application/x-www-form-urlencoded` body of the code exchange.
#[derive(Serialize)]
pub(super) struct CodeExchangeForm<'a> {
    pub(super) grant_type: &'static str,
    pub(super) code: &'a str,
    pub(super) redirect_uri: &'a str,
    pub(super) client_id: &'a str,
    pub(super) client_secret: &'a str,
    pub(super) code_verifier: &'a str,
}

#[derive(Deserialize)]
pub(super) struct TokenResponseDto {
    pub(super) access_token: String,
    #[serde(default)]
    pub(super) expires_in: Option<i64>,
    #[serde(default)]
    pub(super) scope: Option<String>,
    #[serde(default)]
    pub(super) token_type: Option<String>,
}

/// RFC 6749 section 5.2 error body.
#[derive(Debug, Deserialize)]
pub(super) struct TokenErrorDto {
    pub(super) error: String,
    #[serde(default)]
    pub(super) error_description: Option<String>,
}

impl TokenErrorDto {
    pub(super) fn describe(&self) -> String {
        match self.error_description.as_deref() {
            Some(description) if !description.trim().is_empty() => {
                format!("{}: {description}", self.error)
            }
            _ => self.error.clone(),
        }
    }
}
