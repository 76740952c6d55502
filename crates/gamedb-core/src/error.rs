//! # Error Types
//!
//! Errors for identifier parsing. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Error produced when a string does not parse as a game identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The input is not a well-formed UUID in canonical textual form.
    #[error("'{value}' is not a valid game identifier (expected a canonical UUID)")]
    MalformedId {
        /// The offending input string.
        value: String,
    },
}
