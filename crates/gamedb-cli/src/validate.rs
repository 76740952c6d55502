//! # Validate Subcommand
//!
//! Per-file validation pipeline and the batch runner over a directory
//! of game documents.
//!
//! The pipeline is an explicit sequence with early exit: load the
//! document, evaluate it against the schema, and only if the schema
//! check passed run the identity cross-validation. Any per-file error
//! — unreadable file, malformed YAML, schema violation, identity
//! violation — is logged and counted as that file's failure; it never
//! aborts the batch. The batch loop is the recovery boundary.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Args;

use gamedb_schema::{load_game_document, reduce, FormatRegistry, GameSchema, IdValidator};

/// Arguments for the `gamedb validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory containing game documents (one YAML file per game).
    /// Defaults to `games/` under the repository root.
    #[arg(long)]
    pub games_dir: Option<PathBuf>,

    /// Path to the game schema. Defaults to `schemas/game.json` under
    /// the repository root.
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Validate a specific game file, or a directory of game files
    /// (overrides --games-dir).
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

/// Validation outcome for a single file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// The file that was validated.
    pub path: PathBuf,
    /// True iff the file failed any stage of the pipeline.
    pub failed: bool,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of files processed.
    pub total: usize,
    /// Number that passed every check.
    pub passed: usize,
    /// Number that failed at least one check.
    pub failed: usize,
    /// True iff the run stopped early because cancellation was requested.
    pub cancelled: bool,
}

impl BatchReport {
    /// The run's summary line, as emitted to the log.
    pub fn summary(&self) -> String {
        if self.failed == 0 {
            "All files passed validation".to_string()
        } else {
            format!("{} file(s) failed validation", self.failed)
        }
    }
}

/// Execute the validate subcommand.
///
/// Returns the process exit code: 0 when every file passed, 1 when any
/// file failed validation. Operational errors (unloadable schema,
/// missing directory) propagate as `Err` and map to exit code 2.
pub fn run_validate(args: &ValidateArgs, repo_root: &Path) -> Result<u8> {
    let schema_path = args
        .schema
        .clone()
        .unwrap_or_else(|| repo_root.join("schemas").join("game.json"));

    let registry = FormatRegistry::with_defaults();
    let schema = GameSchema::load(&schema_path, &registry)
        .with_context(|| format!("failed to load schema {}", schema_path.display()))?;

    tracing::debug!(
        schema = %schema_path.display(),
        formats = ?registry.names(),
        "loaded game schema"
    );

    // Cancellation is cooperative and checked once per file; signal
    // wiring is still pending, so the flag is never set from here.
    let cancel = AtomicBool::new(false);

    // A positional PATH narrows the run to one file or replaces the
    // games directory; otherwise the whole games directory is batched.
    let report = match &args.path {
        Some(path) if path.is_file() => {
            let mut id_validator = IdValidator::new();
            let outcome = validate_file(&schema, &mut id_validator, path);
            BatchReport {
                total: 1,
                passed: usize::from(!outcome.failed),
                failed: usize::from(outcome.failed),
                cancelled: false,
            }
        }
        Some(path) => validate_directory(&schema, path, &cancel)?,
        None => {
            let games_dir = args
                .games_dir
                .clone()
                .unwrap_or_else(|| repo_root.join("games"));
            validate_directory(&schema, &games_dir, &cancel)?
        }
    };

    if report.failed == 0 {
        tracing::info!("{}", report.summary());
        Ok(0)
    } else {
        tracing::error!("{}", report.summary());
        Ok(1)
    }
}

/// Validate every file in a directory, one at a time in sorted order.
///
/// The cancellation flag is checked before opening each file; a file
/// already in progress always completes. Harvested identifiers
/// accumulate across the whole batch in one [`IdValidator`].
pub fn validate_directory(
    schema: &GameSchema,
    games_dir: &Path,
    cancel: &AtomicBool,
) -> Result<BatchReport> {
    let entries = std::fs::read_dir(games_dir)
        .with_context(|| format!("cannot read games directory {}", games_dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut id_validator = IdValidator::new();
    let mut report = BatchReport::default();

    for file in &files {
        if cancel.load(Ordering::Relaxed) {
            tracing::warn!("cancellation requested; stopping before next file");
            report.cancelled = true;
            break;
        }

        report.total += 1;
        let outcome = validate_file(schema, &mut id_validator, file);
        if outcome.failed {
            report.failed += 1;
        } else {
            report.passed += 1;
        }
    }

    Ok(report)
}

/// Run the full pipeline for one file. Never returns an error: any
/// failure becomes `failed = true` in the outcome.
pub fn validate_file(schema: &GameSchema, ids: &mut IdValidator, path: &Path) -> FileOutcome {
    tracing::info!(file = %path.display(), "validating file");

    let failed = match run_pipeline(schema, ids, path) {
        Ok(failed) => failed,
        Err(e) => {
            tracing::error!(file = %path.display(), "{e:#}");
            true
        }
    };

    FileOutcome {
        path: path.to_path_buf(),
        failed,
    }
}

/// The per-file pipeline: load, schema-evaluate, then identity-check.
///
/// The schema check gates the identity check — a file with schema
/// violations is reported and the identity stage is skipped.
fn run_pipeline(schema: &GameSchema, ids: &mut IdValidator, path: &Path) -> Result<bool> {
    let document = load_game_document(path)?;

    let summary = reduce(&schema.evaluate(&document));
    summary.log();
    if summary.failed {
        return Ok(true);
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if let Err(violation) = ids.validate_file_identity(stem, &document) {
        tracing::error!(file = %path.display(), "{violation}");
        return Ok(true);
    }

    Ok(false)
}
