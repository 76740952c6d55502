//! # gamedb-core — Foundational Types for the Game Metadata Database
//!
//! Defines the identifier primitives shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A game is identified by
//!    a [`GameId`] — a validated UUID newtype. No bare strings for
//!    identifiers; parsing happens exactly once, at the boundary.
//!
//! 2. **Canonical textual form.** `GameId` displays as the lowercase
//!    hyphenated UUID form, regardless of the case the input used. Two
//!    ids that differ only in case compare equal.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `gamedb-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;

pub use error::IdentityError;
pub use identity::GameId;
