//! DTOs for the Sheets `values:append` call.

use serde::{Deserialize, Serialize};

/// Request body: a single-row value range.
#[derive(Debug, Serialize)]
pub(super) struct AppendValuesDto<'a> {
    pub(super) values: [&'a [String]; 1],
}

impl<'a> AppendValuesDto<'a> {
    pub(super) fn single_row(row: &'a [String]) -> Self {
        Self { values: [row] }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AppendResponseDto {
    #[serde(default)]
    pub(super) updates: Option<UpdateValuesDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateValuesDto {
    #[serde(default)]
    pub(super) updated_range: Option<String>,
}

impl AppendResponseDto {
    pub(super) fn into_updated_range(self) -> Option<String> {
        self.updates.and_then(|updates| updates.updated_range)
    }
}
