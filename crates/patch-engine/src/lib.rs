//! Applying accepted suggestions to a document
//!
//! Patches never corrupt text: a span is only replaced when the document
//! still holds the text the issue was computed from.

pub mod accept;
pub mod apply;
pub mod error;

pub use accept::{accept_and_remove, Acceptance};
pub use apply::{apply_batch, apply_selection, apply_single, PatchOutcome};
pub use error::PatchError;
