//! Batch entry points: walk the root, filter, and run both tools per file.
//!
//! Files are handled strictly one after another and each tool is awaited
//! before the next starts. A tool failure is recorded on that file's
//! [`FileResult`] and the batch carries on; the text tool still runs after
//! a failed OCR step. Only problems with the tree itself (missing root,
//! unreadable directory) end the run early.

use crate::candidate::{ocr_output_path, text_output_path, FileEntry};
use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::output::{BatchReport, BatchStats, FileResult, PlannedFile};
use crate::pipeline::{tools, walk};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Walk `config.root` and return every candidate with its output paths.
///
/// No tool is spawned and nothing is written.
pub async fn plan(config: &BatchConfig) -> Result<Vec<PlannedFile>, BatchError> {
    let entries = discover(&config.root).await?;
    Ok(entries
        .iter()
        .filter(|e| e.is_candidate())
        .map(|e| planned(&e.path))
        .collect())
}

/// Run the OCR tool and then the text tool on one PDF.
///
/// Never fails: tool errors are stored in [`FileResult::errors`].
pub async fn process_file(source: &Path, config: &BatchConfig) -> FileResult {
    let start = Instant::now();
    let PlannedFile {
        source,
        ocr_path,
        text_path,
    } = planned(source);

    let mut errors = Vec::new();

    let ocr = tools::ocr_invocation(&config.ocr_tool, config.skip_text, &source, &ocr_path);
    if let Err(e) = ocr.run(config.tool_timeout_secs).await {
        warn!("{}: {}", source.display(), e);
        errors.push(e);
    }

    let text = tools::text_invocation(&config.text_tool, &ocr_path);
    if let Err(e) = text.run(config.tool_timeout_secs).await {
        warn!("{}: {}", ocr_path.display(), e);
        errors.push(e);
    }

    FileResult {
        source,
        ocr_path,
        text_path,
        duration_ms: start.elapsed().as_millis() as u64,
        errors,
    }
}

/// Process every candidate under `config.root`.
///
/// # Returns
/// `Ok(BatchReport)` once every candidate has been attempted, even if some
/// or all tools failed (check `report.stats.failed`).
///
/// # Errors
/// Returns `Err(BatchError)` only when the tree cannot be walked.
pub async fn process_tree(config: &BatchConfig) -> Result<BatchReport, BatchError> {
    let total_start = Instant::now();
    info!("Scanning {}", config.root.display());

    let entries = discover(&config.root).await?;

    let mut stats = BatchStats {
        files_seen: entries.len(),
        ..BatchStats::default()
    };
    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in entries {
        match entry.skip {
            None => candidates.push(entry.path),
            Some(reason) => {
                debug!("Skipping {} ({:?})", entry.path.display(), reason);
                stats.record_skip(reason);
            }
        }
    }
    stats.candidates = candidates.len();
    info!(
        "{} candidates among {} files",
        stats.candidates, stats.files_seen
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(candidates.len());
    }

    let total = candidates.len();
    let mut files = Vec::with_capacity(total);

    for (i, path) in candidates.iter().enumerate() {
        let index = i + 1;
        info!("Processing {}", path.display());
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(index, total, path);
        }

        let result = if config.dry_run {
            FileResult::from(planned(path))
        } else {
            process_file(path, config).await
        };

        if let Some(ref cb) = config.progress_callback {
            match result.first_error() {
                None => cb.on_file_complete(index, total, path),
                Some(e) => cb.on_file_error(index, total, path, &e.to_string()),
            }
        }

        // A dry run attempts nothing, so it neither succeeds nor fails.
        if !config.dry_run {
            if result.is_success() {
                stats.succeeded += 1;
            } else {
                stats.failed += 1;
            }
        }
        files.push(result);
    }

    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Batch complete: {}/{} files, {} failed, {}ms total",
        stats.succeeded, stats.candidates, stats.failed, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, stats.succeeded);
    }

    Ok(BatchReport { files, stats })
}

/// Synchronous wrapper around [`process_tree`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_tree_sync(config: &BatchConfig) -> Result<BatchReport, BatchError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| BatchError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process_tree(config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn planned(source: &Path) -> PlannedFile {
    let ocr_path = ocr_output_path(source);
    let text_path = text_output_path(&ocr_path);
    PlannedFile {
        source: source.to_path_buf(),
        ocr_path,
        text_path,
    }
}

impl From<PlannedFile> for FileResult {
    fn from(p: PlannedFile) -> Self {
        FileResult {
            source: p.source,
            ocr_path: p.ocr_path,
            text_path: p.text_path,
            duration_ms: 0,
            errors: Vec::new(),
        }
    }
}

/// Run the blocking walk off the async worker threads.
async fn discover(root: &Path) -> Result<Vec<FileEntry>, BatchError> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || walk::discover(&root))
        .await
        .map_err(|e| BatchError::Internal(format!("Walk task panicked: {}", e)))?
}
