//! Service backends.
//!
//! # Available Backends
//!
//! - [`boson`] - Boson AI's chat-completions audio generation endpoint

pub mod boson;

pub use boson::{Boson, BosonConfig};
