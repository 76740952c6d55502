//! # gamedb-schema — Validation Engine for Game Metadata Documents
//!
//! Validates game metadata documents in two layers:
//!
//! 1. **Structural** ([`validate`], [`evaluation`]): JSON Schema
//!    (draft 2020-12) evaluation with strict format enforcement,
//!    producing a hierarchical result tree that is reduced to an
//!    overall pass/fail decision plus per-node diagnostic blocks.
//! 2. **Semantic** ([`ids`], [`formats`]): invariants a schema cannot
//!    express — the filename↔embedded-id identity invariant, store
//!    identifier harvesting, and pluggable format predicates such as
//!    the ISO 3166-1 alpha-3 country-code check.
//!
//! ## Crate Policy
//!
//! - Format predicates are registered into an explicit
//!   [`formats::FormatRegistry`] passed to schema loading — no hidden
//!   process-wide state.
//! - Result-tree traversal is iterative; stack usage is bounded
//!   regardless of document nesting depth.
//! - Malformed input is a typed error, never a panic: parse failures
//!   surface as [`validate::SchemaError::DocumentLoad`] and identity
//!   problems as [`ids::IdentityViolation`].

pub mod evaluation;
pub mod formats;
pub mod ids;
pub mod validate;

pub use evaluation::{reduce, DiagnosticBlock, EvaluationNode, NodeError, ResultSummary};
pub use formats::{country_code, FormatPredicate, FormatRegistry, COUNTRY_CODE_FORMAT};
pub use ids::{IdValidator, IdentifierRecord, IdentityViolation, ID_POINTERS};
pub use validate::{load_game_document, GameSchema, SchemaError};
