//! Reqwest-backed Drive photo store.
//!
//! This adapter owns transport details only: the multipart body, timeout and
//! HTTP error mapping, and decoding the created file id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::{DriveFileDto, DriveFileMetadataDto};
use crate::domain::Credential;
use crate::domain::ports::{PhotoStore, PhotoStoreError, PhotoUploadRequest, StoredPhoto};
use crate::outbound::http_errors::{StatusClass, status_message};

/// Drive v3 media upload endpoint.
pub const DEFAULT_DRIVE_UPLOAD_ENDPOINT: &str = "https://www.googleapis.com/upload/drive/v3/files";

const METADATA_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Photo store that uploads each photo as one multipart request.
pub struct DriveHttpPhotoStore {
    client: Client,
    endpoint: Url,
}

impl DriveHttpPhotoStore {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    fn upload_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("uploadType", "multipart");
        url
    }
}

#[async_trait]
impl PhotoStore for DriveHttpPhotoStore {
    async fn upload(
        &self,
        credential: &Credential,
        request: &PhotoUploadRequest,
    ) -> Result<StoredPhoto, PhotoStoreError> {
        let form = build_form(request)?;
        debug!(name = %request.name, bytes = request.bytes.len(), "uploading photo");
        let response = self
            .client
            .post(self.upload_url())
            .bearer_auth(credential.access_token())
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_stored_photo(body.as_ref())
    }
}

fn build_form(request: &PhotoUploadRequest) -> Result<Form, PhotoStoreError> {
    let metadata = serde_json::to_vec(&DriveFileMetadataDto::from(request)).map_err(|error| {
        PhotoStoreError::invalid_request(format!("cannot encode metadata: {error}"))
    })?;
    let metadata = Part::bytes(metadata)
        .mime_str(METADATA_CONTENT_TYPE)
        .map_err(|error| PhotoStoreError::invalid_request(error.to_string()))?;
    let file = Part::bytes(request.bytes.clone())
        .file_name(request.name.clone())
        .mime_str(&request.mime_type)
        .map_err(|error| {
            PhotoStoreError::invalid_request(format!(
                "invalid MIME type {:?}: {error}",
                request.mime_type
            ))
        })?;
    Ok(Form::new().part("metadata", metadata).part("file", file))
}

fn parse_stored_photo(body: &[u8]) -> Result<StoredPhoto, PhotoStoreError> {
    let decoded: DriveFileDto = serde_json::from_slice(body).map_err(|error| {
        PhotoStoreError::decode(format!("invalid Drive JSON payload: {error}"))
    })?;
    decoded
        .into_remote_id()
        .map(|remote_id| StoredPhoto { remote_id })
        .ok_or_else(|| PhotoStoreError::decode("Failed to upload image: response had no file id"))
}

fn map_transport_error(error: reqwest::Error) -> PhotoStoreError {
    if error.is_timeout() {
        PhotoStoreError::timeout(error.to_string())
    } else {
        PhotoStoreError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PhotoStoreError {
    let message = status_message(status, body);
    match StatusClass::of(status) {
        StatusClass::Unauthorized => PhotoStoreError::unauthorized(message),
        StatusClass::Timeout => PhotoStoreError::timeout(message),
        StatusClass::Rejected => PhotoStoreError::rejected(message),
    }
}
