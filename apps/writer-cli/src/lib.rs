//! Writing-assistant front-end
//!
//! One-shot file commands plus a JSON-lines session over stdio.

pub mod commands;
pub mod protocol;
pub mod transport;

pub use protocol::{Event, Request};
