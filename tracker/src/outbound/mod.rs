//! Outbound adapters implementing domain ports against Google's HTTP APIs.
//!
//! - **drive**: multipart photo upload (`PhotoStore`)
//! - **sheets**: values append (`SheetLog`)
//! - **oauth**: loopback authorization-code consent with PKCE (`ConsentFlow`)
//!
//! Adapters are thin translators between domain types and wire DTOs. They own
//! transport details only and contain no sequencing logic.

pub mod drive;
mod http_errors;
pub mod oauth;
pub mod sheets;
