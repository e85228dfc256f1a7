//! Google Drive outbound adapter.
//!
//! This module provides a thin HTTP implementation of the `PhotoStore` port.

mod dto;
mod http_store;

pub use http_store::{DEFAULT_DRIVE_UPLOAD_ENDPOINT, DriveHttpPhotoStore};
