//! Integration test: validate the in-repo sample game documents
//! against `schemas/game.json`.
//!
//! This matches what `gamedb validate` does over the repository's own
//! `games/` directory: every sample document must pass both the schema
//! evaluation and the identity cross-check.

use std::path::PathBuf;

use gamedb_schema::{load_game_document, reduce, FormatRegistry, GameSchema, IdValidator};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

/// All game document files, sorted.
fn game_files() -> Vec<PathBuf> {
    let games_dir = repo_root().join("games");
    let mut files: Vec<PathBuf> = std::fs::read_dir(&games_dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", games_dir.display()))
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}

#[test]
fn sample_games_exist() {
    assert!(
        !game_files().is_empty(),
        "expected sample documents under {}",
        repo_root().join("games").display()
    );
}

#[test]
fn all_sample_games_pass_schema_validation() {
    let registry = FormatRegistry::with_defaults();
    let schema =
        GameSchema::load(&repo_root().join("schemas/game.json"), &registry).expect("schema loads");

    let mut failures = Vec::new();
    for path in game_files() {
        let document = load_game_document(&path).expect("sample document parses");
        let summary = reduce(&schema.evaluate(&document));
        if summary.failed {
            failures.push(format!("{}: {:?}", path.display(), summary.blocks));
        }
    }

    assert!(
        failures.is_empty(),
        "{} sample document(s) failed schema validation:\n{}",
        failures.len(),
        failures.join("\n")
    );
}

#[test]
fn all_sample_games_pass_identity_validation() {
    let mut ids = IdValidator::new();

    for path in game_files() {
        let document = load_game_document(&path).expect("sample document parses");
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .expect("utf-8 file name");
        ids.validate_file_identity(stem, &document)
            .unwrap_or_else(|v| panic!("{}: {v}", path.display()));
    }

    // Every sample document contributed its root id to the harvest.
    assert_eq!(ids.records_for("Game ID").len(), game_files().len());
}
