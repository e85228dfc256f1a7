//! Driven port for uploading meal photos to object storage.

use std::fmt;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::Credential;

/// One photo upload: metadata plus the binary payload.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoUploadRequest {
    /// Object name, unique per submission.
    pub name: String,
    /// MIME type of the payload.
    pub mime_type: String,
    /// Folder the object is created in.
    pub parent_folder_id: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for PhotoUploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoUploadRequest")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("parent_folder_id", &self.parent_folder_id)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Identifier of an object the store confirmed it created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    /// Store-assigned object identifier.
    pub remote_id: String,
}

define_port_error! {
    /// Errors surfaced while uploading a photo.
    pub enum PhotoStoreError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "photo upload transport failed: {message}",
        /// The upload exceeded the client timeout.
        Timeout { message: String } =>
            "photo upload timed out: {message}",
        /// The store rejected the bearer credential.
        Unauthorized { message: String } =>
            "photo upload unauthorized: {message}",
        /// The store answered with a non-success status.
        Rejected { message: String } =>
            "photo upload rejected: {message}",
        /// The store response could not be decoded or lacked an object id.
        Decode { message: String } =>
            "photo upload response invalid: {message}",
        /// The adapter could not build the request.
        InvalidRequest { message: String } =>
            "photo upload request invalid: {message}",
    }
}

impl PhotoStoreError {
    /// Whether the failure means the credential must be renewed.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Port for writing photos to object storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Upload one photo as a single multipart request.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoStoreError`] on transport failure, non-success status,
    /// or a response without an object identifier.
    async fn upload(
        &self,
        credential: &Credential,
        request: &PhotoUploadRequest,
    ) -> Result<StoredPhoto, PhotoStoreError>;
}
