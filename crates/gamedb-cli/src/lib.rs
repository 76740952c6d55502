//! # gamedb-cli — Command-Line Interface for the Game Metadata Database
//!
//! Provides the `gamedb` binary.
//!
//! ## Subcommands
//!
//! - `gamedb validate` — validate every game document in the games
//!   directory against the game schema, then enforce the
//!   filename/embedded-id identity invariant per file.
//!
//! ## Exit Codes
//!
//! - `0` — every file passed validation.
//! - `1` — one or more files failed validation.
//! - `2` — operational error (unloadable schema, unreadable directory).
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business
//!   logic; handlers delegate schema evaluation and identity checks to
//!   `gamedb-schema`.
//! - No single file's failure, of any kind, terminates validation of
//!   subsequent files.

pub mod validate;
