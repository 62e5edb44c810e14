//! Editing session for the writing assistant
//!
//! Wires the proofing engine and patch engine around one mutable document:
//! - [`scheduler::AnalysisScheduler`] debounces edits and publishes only
//!   results for the latest version
//! - [`session::EditingSession`] owns the document and applies patches

pub mod config;
pub mod error;
pub mod scheduler;
pub mod session;

pub use config::SessionConfig;
pub use error::SessionError;
pub use scheduler::{AnalysisScheduler, BulkEditGuard};
pub use session::{analyzer_from_config, dictionary_store_from_config, EditingSession, SessionStatus};
