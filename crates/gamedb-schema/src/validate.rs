//! # Schema Loading & Evaluation
//!
//! Loads the game schema (JSON Schema, draft 2020-12), wires in the
//! custom format predicates, and evaluates documents into the
//! hierarchical result tree consumed by [`crate::evaluation::reduce`].
//!
//! Format enforcement is strict: the `format` keyword is validated
//! (not treated as an annotation), and a schema referencing a format
//! name that is neither a draft built-in nor a registered predicate
//! fails to load rather than being silently ignored.

use std::collections::BTreeSet;
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

use crate::evaluation::EvaluationNode;
use crate::formats::FormatRegistry;

/// Format names defined by JSON Schema draft 2020-12 that the engine
/// validates natively.
const BUILTIN_FORMATS: &[&str] = &[
    "date",
    "date-time",
    "duration",
    "email",
    "hostname",
    "idn-email",
    "idn-hostname",
    "ipv4",
    "ipv6",
    "iri",
    "iri-reference",
    "json-pointer",
    "regex",
    "relative-json-pointer",
    "time",
    "uri",
    "uri-reference",
    "uri-template",
    "uuid",
];

/// Error during schema loading, document loading, or validator construction.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema file could not be read or parsed.
    #[error("schema load error for '{path}': {reason}")]
    SchemaLoad {
        /// Path to the schema file.
        path: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The schema references a format with no registered predicate.
    #[error("schema references unknown format '{name}'; register a predicate for it before loading")]
    UnknownFormat {
        /// The unrecognized format name.
        name: String,
    },

    /// The compiled validator could not be built (e.g. invalid schema).
    #[error("validator build error: {reason}")]
    ValidatorBuild {
        /// Reason the validator could not be compiled.
        reason: String,
    },

    /// The document file could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// IO error reading schema or document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A compiled game schema with strict format enforcement.
///
/// Construction loads the schema once; evaluation is read-only and can
/// be repeated for every document in a run.
#[derive(Debug)]
pub struct GameSchema {
    validator: Validator,
}

impl GameSchema {
    /// Load a schema file and compile it with the given format registry.
    ///
    /// Every `format` keyword appearing anywhere in the schema must name
    /// either a draft 2020-12 built-in or a predicate registered in
    /// `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoad`] if the file cannot be read or
    /// parsed, [`SchemaError::UnknownFormat`] for an unrecognized format
    /// reference, and [`SchemaError::ValidatorBuild`] if the schema does
    /// not compile.
    pub fn load(path: &Path, registry: &FormatRegistry) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::SchemaLoad {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;

        let schema: Value = serde_json::from_str(&content).map_err(|e| SchemaError::SchemaLoad {
            path: path.display().to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;

        Self::from_value(&schema, registry)
    }

    /// Compile an already-parsed schema value. See [`GameSchema::load`].
    pub fn from_value(schema: &Value, registry: &FormatRegistry) -> Result<Self, SchemaError> {
        for name in referenced_formats(schema) {
            if !BUILTIN_FORMATS.contains(&name.as_str()) && !registry.contains(&name) {
                return Err(SchemaError::UnknownFormat { name });
            }
        }

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        opts.should_validate_formats(true);
        opts.should_ignore_unknown_formats(false);
        registry.install(&mut opts);

        let validator = opts
            .build(schema)
            .map_err(|e| SchemaError::ValidatorBuild {
                reason: e.to_string(),
            })?;

        Ok(Self { validator })
    }

    /// Evaluate a document against the schema, producing the
    /// hierarchical result tree.
    ///
    /// The tree always has a root node; every violation reported by the
    /// engine becomes an error on the node at its instance location,
    /// with intermediate nodes created along the pointer path.
    pub fn evaluate(&self, instance: &Value) -> EvaluationNode {
        let mut root = EvaluationNode::root();
        let mut error_count = 0usize;

        for error in self.validator.iter_errors(instance) {
            let pointer = error.instance_path.to_string();
            let schema_path = error.schema_path.to_string();
            let keyword = keyword_from_schema_path(&schema_path);
            root.insert_error(&pointer, keyword, error.to_string());
            error_count += 1;
        }

        tracing::trace!(errors = error_count, "schema evaluation complete");
        root
    }
}

/// The schema keyword that produced an error, taken from the last
/// non-empty segment of its schema path. An empty path (a violation
/// reported against the schema root) yields `"schema"`.
fn keyword_from_schema_path(schema_path: &str) -> String {
    schema_path
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("schema")
        .to_string()
}

/// Collect every format name the schema references, without recursion.
fn referenced_formats(schema: &Value) -> BTreeSet<String> {
    let mut formats = BTreeSet::new();
    let mut stack = vec![schema];
    while let Some(value) = stack.pop() {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(name)) = map.get("format") {
                    formats.insert(name.clone());
                }
                stack.extend(map.values());
            }
            Value::Array(items) => stack.extend(items.iter()),
            _ => {}
        }
    }
    formats
}

/// Load a game document from disk: parse the YAML and convert it to a
/// JSON value for schema evaluation.
///
/// # Errors
///
/// Returns [`SchemaError::DocumentLoad`] for unreadable files, YAML
/// parse failures, empty documents, and YAML constructs with no JSON
/// equivalent. Malformed input is an ordinary per-file failure, never
/// a panic.
pub fn load_game_document(path: &Path) -> Result<Value, SchemaError> {
    let content = std::fs::read_to_string(path).map_err(|e| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;

    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| SchemaError::DocumentLoad {
            path: path.display().to_string(),
            reason: format!("invalid YAML: {e}"),
        })?;

    if yaml.is_null() {
        return Err(SchemaError::DocumentLoad {
            path: path.display().to_string(),
            reason: "document is empty".to_string(),
        });
    }

    yaml_to_json_value(&yaml).map_err(|reason| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    })
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Game documents use only the JSON-compatible subset of YAML; tags are
/// stripped, and map keys must be scalars.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::reduce;
    use crate::formats::{FormatRegistry, COUNTRY_CODE_FORMAT};
    use serde_json::json;

    fn game_schema_value() -> Value {
        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "required": ["id", "title"],
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "title": { "type": "string", "minLength": 1 },
                "regions": {
                    "type": "array",
                    "items": { "type": "string", "format": COUNTRY_CODE_FORMAT }
                }
            }
        })
    }

    #[test]
    fn valid_document_produces_clean_tree() {
        let registry = FormatRegistry::with_defaults();
        let schema = GameSchema::from_value(&game_schema_value(), &registry).unwrap();
        let doc = json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "title": "Example Game",
            "regions": ["USA", "deu"]
        });
        let tree = schema.evaluate(&doc);
        let summary = reduce(&tree);
        assert!(!summary.failed, "{:?}", summary.blocks);
    }

    #[test]
    fn missing_required_field_fails_at_root() {
        let registry = FormatRegistry::with_defaults();
        let schema = GameSchema::from_value(&game_schema_value(), &registry).unwrap();
        let doc = json!({ "title": "No Id" });
        let summary = reduce(&schema.evaluate(&doc));
        assert!(summary.failed);
        let root_block = summary
            .blocks
            .iter()
            .find(|b| b.instance_location.is_empty())
            .unwrap();
        assert!(root_block.messages.iter().any(|m| m.contains("id")));
    }

    #[test]
    fn bad_country_code_fails_at_its_location() {
        let registry = FormatRegistry::with_defaults();
        let schema = GameSchema::from_value(&game_schema_value(), &registry).unwrap();
        let doc = json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "title": "Example Game",
            "regions": ["USA", "ZZZ"]
        });
        let summary = reduce(&schema.evaluate(&doc));
        assert!(summary.failed);
        assert!(summary
            .blocks
            .iter()
            .any(|b| b.instance_location == "/regions/1"));
    }

    #[test]
    fn malformed_uuid_fails_format_check() {
        let registry = FormatRegistry::with_defaults();
        let schema = GameSchema::from_value(&game_schema_value(), &registry).unwrap();
        let doc = json!({ "id": "not-a-uuid", "title": "Bad Id" });
        let summary = reduce(&schema.evaluate(&doc));
        assert!(summary.failed);
        assert!(summary.blocks.iter().any(|b| b.instance_location == "/id"));
    }

    #[test]
    fn multiple_violations_all_reported() {
        let registry = FormatRegistry::with_defaults();
        let schema = GameSchema::from_value(&game_schema_value(), &registry).unwrap();
        let doc = json!({
            "id": "not-a-uuid",
            "title": "",
            "regions": ["ZZZ"]
        });
        let summary = reduce(&schema.evaluate(&doc));
        assert!(summary.failed);
        // One block per failing node, all in one pass.
        assert!(summary.blocks.len() >= 3, "{:?}", summary.blocks);
    }

    #[test]
    fn unknown_format_is_a_load_error() {
        let registry = FormatRegistry::new();
        let schema = json!({
            "type": "object",
            "properties": {
                "code": { "type": "string", "format": "no-such-format" }
            }
        });
        let err = GameSchema::from_value(&schema, &registry).unwrap_err();
        match err {
            SchemaError::UnknownFormat { name } => assert_eq!(name, "no-such-format"),
            other => panic!("expected UnknownFormat, got: {other}"),
        }
    }

    #[test]
    fn country_code_format_requires_registration() {
        // The same schema fails with an empty registry and loads with
        // the default one.
        let schema = game_schema_value();
        assert!(GameSchema::from_value(&schema, &FormatRegistry::new()).is_err());
        assert!(GameSchema::from_value(&schema, &FormatRegistry::with_defaults()).is_ok());
    }

    #[test]
    fn keyword_extraction_takes_last_segment() {
        assert_eq!(keyword_from_schema_path("/properties/id/format"), "format");
        assert_eq!(keyword_from_schema_path("/required"), "required");
    }

    #[test]
    fn keyword_extraction_falls_back_on_empty_path() {
        assert_eq!(keyword_from_schema_path(""), "schema");
        assert_eq!(keyword_from_schema_path("/"), "schema");
    }

    #[test]
    fn referenced_formats_walks_nested_schemas() {
        let formats = referenced_formats(&game_schema_value());
        assert!(formats.contains("uuid"));
        assert!(formats.contains(COUNTRY_CODE_FORMAT));
        assert_eq!(formats.len(), 2);
    }

    #[test]
    fn load_reads_schema_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(&path, game_schema_value().to_string()).unwrap();
        let registry = FormatRegistry::with_defaults();
        assert!(GameSchema::load(&path, &registry).is_ok());
    }

    #[test]
    fn load_missing_schema_file_is_an_error() {
        let registry = FormatRegistry::with_defaults();
        let err = GameSchema::load(Path::new("/no/such/schema.json"), &registry).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaLoad { .. }));
    }

    #[test]
    fn load_game_document_parses_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.yaml");
        std::fs::write(
            &path,
            "id: 3fa85f64-5717-4562-b3fc-2c963f66afa6\ntitle: Example\nregions:\n  - USA\n",
        )
        .unwrap();
        let doc = load_game_document(&path).unwrap();
        assert_eq!(doc["id"], "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert_eq!(doc["regions"][0], "USA");
    }

    #[test]
    fn load_game_document_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yaml");
        std::fs::write(&path, "").unwrap();
        let err = load_game_document(&path).unwrap_err();
        assert!(matches!(err, SchemaError::DocumentLoad { .. }));
    }

    #[test]
    fn load_game_document_rejects_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "id: [unclosed\n  - sequence").unwrap();
        let err = load_game_document(&path).unwrap_err();
        assert!(matches!(err, SchemaError::DocumentLoad { .. }));
    }

    #[test]
    fn yaml_to_json_conversion() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            "title: Example\ncount: 42\nenabled: true\nitems:\n  - one\n  - two\n",
        )
        .unwrap();
        let value = yaml_to_json_value(&yaml).unwrap();
        assert_eq!(value["title"], "Example");
        assert_eq!(value["count"], 42);
        assert_eq!(value["enabled"], true);
        assert_eq!(value["items"][1], "two");
    }
}
