//! Command-line presentation adapter.
//!
//! Parses arguments, reads photos from disk, drives the authorizer and the
//! submission sequencer, and reflects their state as terminal text.

mod app;
mod args;
mod photo;
mod presenter;
mod session;

pub use app::App;
pub use args::{CliArgs, Command, LogArgs};
pub use photo::{PhotoLoadError, load_photo, mime_type_for};
pub use presenter::TerminalPresenter;
pub use session::run_session;
