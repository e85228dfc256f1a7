//! Reqwest-backed Sheets append adapter.
//!
//! This adapter owns transport details only: URL construction, timeout and
//! HTTP error mapping, and decoding the updated range.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{AppendResponseDto, AppendValuesDto};
use crate::domain::Credential;
use crate::domain::ports::{AppendRowRequest, AppendedRange, SheetLog, SheetLogError};
use crate::outbound::http_errors::{StatusClass, status_message};

/// Sheets API root; `v4/spreadsheets/...` is appended per call.
pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/";

/// Sheet log that appends one row per call.
pub struct SheetsHttpLog {
    client: Client,
    base: Url,
    api_key: Option<Zeroizing<String>>,
}

impl SheetsHttpLog {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            api_key: None,
        })
    }

    /// Send `key=<api key>` with every call.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.trim().is_empty()).then(|| Zeroizing::new(api_key));
        self
    }

    fn append_url(&self, request: &AppendRowRequest) -> Result<Url, SheetLogError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| SheetLogError::invalid_request("sheets endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                request.spreadsheet_id.as_str(),
                "values",
                format!("{}:append", request.range).as_str(),
            ]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("valueInputOption", request.value_input.as_str());
            if let Some(key) = &self.api_key {
                query.append_pair("key", key.as_str());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl SheetLog for SheetsHttpLog {
    async fn append_row(
        &self,
        credential: &Credential,
        request: &AppendRowRequest,
    ) -> Result<AppendedRange, SheetLogError> {
        if request.spreadsheet_id.trim().is_empty() {
            return Err(SheetLogError::invalid_request("spreadsheet id must not be blank"));
        }
        let url = self.append_url(request)?;
        debug!(
            spreadsheet_id = %request.spreadsheet_id,
            range = %request.range,
            cells = request.values.len(),
            "appending row"
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(credential.access_token())
            .json(&AppendValuesDto::single_row(&request.values))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_appended_range(body.as_ref())
    }
}

fn parse_appended_range(body: &[u8]) -> Result<AppendedRange, SheetLogError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AppendedRange::default());
    }
    let decoded: AppendResponseDto = serde_json::from_slice(body).map_err(|error| {
        SheetLogError::decode(format!("invalid Sheets JSON payload: {error}"))
    })?;
    Ok(AppendedRange {
        updated_range: decoded.into_updated_range(),
    })
}

fn map_transport_error(error: reqwest::Error) -> SheetLogError {
    if error.is_timeout() {
        SheetLogError::timeout(error.to_string())
    } else {
        SheetLogError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SheetLogError {
    let message = status_message(status, body);
    match StatusClass::of(status) {
        StatusClass::Unauthorized => SheetLogError::unauthorized(message),
        StatusClass::Timeout => SheetLogError::timeout(message),
        StatusClass::Rejected => SheetLogError::rejected(message),
    }
}
