//! DTOs for the Drive multipart upload.

use serde::{Deserialize, Serialize};

use crate::domain::ports::PhotoUploadRequest;

/// Metadata part sent ahead of the file bytes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DriveFileMetadataDto<'a> {
    pub(super) name: &'a str,
    pub(super) mime_type: &'a str,
    pub(super) parents: [&'a str; 1],
}

impl<'a> From<&'a PhotoUploadRequest> for DriveFileMetadataDto<'a> {
    fn from(request: &'a PhotoUploadRequest) -> Self {
        Self {
            name: &request.name,
            mime_type: &request.mime_type,
            parents: [&request.parent_folder_id],
        }
    }
}

/// Subset of the Drive `File` resource returned by the upload.
#[derive(Debug, Deserialize)]
pub(super) struct DriveFileDto {
    #[serde(default)]
    pub(super) id: Option<String>,
}

impl DriveFileDto {
    /// The created object id, if the response carried a non-blank one.
    pub(super) fn into_remote_id(self) -> Option<String> {
        self.id.filter(|id| !id.trim().is_empty())
    }
}
