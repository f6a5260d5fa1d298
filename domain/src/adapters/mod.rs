//! In-memory adapters that live inside the domain crate for convenience.
//!
//! These back the unit tests and the replay CLI. Toolkit-specific adapters
//! (DOM, native widgets) live with the host application.

pub mod memory;
pub mod scripted_driver;
