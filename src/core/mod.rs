//! Crate-level error type and user-facing error display.

pub mod error;

pub use error::{ErrorContext, VtplError, user_friendly_error};
