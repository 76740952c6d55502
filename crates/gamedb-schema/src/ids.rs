//! # Identity Cross-Validation
//!
//! Enforces the identity invariant a schema cannot express: a game
//! file's name (sans extension) must be a canonical UUID and must equal
//! the `id` embedded at the document root.
//!
//! After both checks pass, the validator harvests identifiers from a
//! fixed set of known locations (root id plus per-storefront ids) into
//! a per-run collection. Harvesting is informational: records are
//! logged and retained, but no uniqueness check is performed on them.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use gamedb_core::GameId;

/// A known identifier location within a game document.
#[derive(Debug, Clone, Copy)]
pub struct IdPointer {
    /// Human-readable label for diagnostics and harvesting.
    pub label: &'static str,
    /// JSON Pointer to the identifier field.
    pub pointer: &'static str,
}

/// The fixed set of identifier locations. Most documents populate only
/// a subset; unresolvable pointers are skipped silently.
pub const ID_POINTERS: &[IdPointer] = &[
    IdPointer {
        label: "Game ID",
        pointer: "/id",
    },
    IdPointer {
        label: "Steam appId",
        pointer: "/stores/steam/appId",
    },
    IdPointer {
        label: "GOG productId",
        pointer: "/stores/gog/productId",
    },
    IdPointer {
        label: "EGS catalogItemId",
        pointer: "/stores/egs/catalogItemId",
    },
    IdPointer {
        label: "Xbox id",
        pointer: "/stores/xbox/id",
    },
];

/// A violation of the identity invariant. Each variant is an ordinary
/// per-file validation failure, never a panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityViolation {
    /// The file's base name is not a well-formed game identifier.
    #[error("file name '{name}' is not a valid game identifier")]
    FileNameNotAnId {
        /// The offending base name.
        name: String,
    },

    /// The document has no root `id` field.
    #[error("document has no root 'id' field")]
    MissingEmbeddedId,

    /// The root `id` field is not a well-formed game identifier.
    #[error("root 'id' value '{value}' is not a valid game identifier")]
    MalformedEmbeddedId {
        /// The offending value, rendered as text.
        value: String,
    },

    /// File name and embedded id disagree.
    #[error("id in file name ({file_id}) does not match id in document ({embedded_id})")]
    IdMismatch {
        /// Identifier derived from the file name.
        file_id: GameId,
        /// Identifier embedded in the document root.
        embedded_id: GameId,
    },
}

/// One harvested identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierRecord {
    /// Label of the location the identifier came from.
    pub label: &'static str,
    /// The identifier value, rendered as text.
    pub value: String,
}

/// Per-run identity validator.
///
/// Owns the harvested-identifier collection, which accumulates across
/// every file the run validates.
#[derive(Debug, Default)]
pub struct IdValidator {
    harvested: HashMap<&'static str, Vec<IdentifierRecord>>,
}

impl IdValidator {
    /// Create a validator with an empty harvest collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the identity invariant for one file.
    ///
    /// `file_stem` is the file's base name without extension. Checks,
    /// in order, stopping at the first failure:
    ///
    /// 1. `file_stem` parses as a [`GameId`];
    /// 2. the document's root `id` exists, is a string, parses as a
    ///    [`GameId`], and equals the file-name id (comparison is on the
    ///    parsed value, so case never matters).
    ///
    /// On success, harvests identifiers from [`ID_POINTERS`]. Harvesting
    /// never fails the file.
    pub fn validate_file_identity(
        &mut self,
        file_stem: &str,
        document: &Value,
    ) -> Result<(), IdentityViolation> {
        let file_id =
            GameId::parse(file_stem).map_err(|_| IdentityViolation::FileNameNotAnId {
                name: file_stem.to_string(),
            })?;

        let embedded_id = match document.get("id") {
            None => return Err(IdentityViolation::MissingEmbeddedId),
            Some(Value::String(s)) => {
                GameId::parse(s).map_err(|_| IdentityViolation::MalformedEmbeddedId {
                    value: s.clone(),
                })?
            }
            Some(other) => {
                return Err(IdentityViolation::MalformedEmbeddedId {
                    value: render_scalar(other),
                })
            }
        };

        if embedded_id != file_id {
            return Err(IdentityViolation::IdMismatch {
                file_id,
                embedded_id,
            });
        }

        self.harvest(document);
        Ok(())
    }

    /// Record every identifier found at a known location.
    fn harvest(&mut self, document: &Value) {
        for info in ID_POINTERS {
            let Some(value) = document.pointer(info.pointer) else {
                continue;
            };
            let rendered = render_scalar(value);
            tracing::info!(id = %rendered, pointer = info.pointer, "{}", info.label);
            self.harvested
                .entry(info.label)
                .or_default()
                .push(IdentifierRecord {
                    label: info.label,
                    value: rendered,
                });
        }
    }

    /// All identifiers harvested so far this run, keyed by label.
    pub fn harvested(&self) -> &HashMap<&'static str, Vec<IdentifierRecord>> {
        &self.harvested
    }

    /// Identifiers harvested for one label.
    pub fn records_for(&self, label: &str) -> &[IdentifierRecord] {
        self.harvested
            .get(label)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Render a JSON scalar as bare text (strings without surrounding
/// quotes, everything else via its JSON rendering).
fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
