//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod consent_flow;
mod photo_store;
mod sheet_log;

#[cfg(test)]
pub use consent_flow::MockConsentFlow;
pub use consent_flow::{ConsentFlow, ConsentFlowError, ConsentPrompt, ConsentRequest};
#[cfg(test)]
pub use photo_store::MockPhotoStore;
pub use photo_store::{PhotoStore, PhotoStoreError, PhotoUploadRequest, StoredPhoto};
#[cfg(test)]
pub use sheet_log::MockSheetLog;
pub use sheet_log::{AppendRowRequest, AppendedRange, SheetLog, SheetLogError, ValueInputOption};
