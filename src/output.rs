//! Result types returned by a batch run.

use crate::candidate::SkipReason;
use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A candidate found by [`crate::process::plan`], with the paths the tools
/// will write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedFile {
    pub source: PathBuf,
    pub ocr_path: PathBuf,
    pub text_path: PathBuf,
}

/// Outcome of running both tools on one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// The original PDF.
    pub source: PathBuf,
    /// Where the OCR tool was asked to write.
    pub ocr_path: PathBuf,
    /// Where the text tool is expected to write.
    pub text_path: PathBuf,
    /// Wall-clock time spent in both tools.
    pub duration_ms: u64,
    /// Tool failures in the order they happened. Empty on success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FileError>,
}

impl FileResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first_error(&self) -> Option<&FileError> {
        self.errors.first()
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Every non-directory entry under the root.
    pub files_seen: usize,
    pub candidates: usize,
    /// Files without a `.pdf` suffix.
    pub skipped_not_pdf: usize,
    /// `ocr-*.pdf` files from earlier runs.
    pub skipped_ocr_output: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
}

impl BatchStats {
    pub(crate) fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NotPdf => self.skipped_not_pdf += 1,
            SkipReason::OcrOutput => self.skipped_ocr_output += 1,
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub files: Vec<FileResult>,
    pub stats: BatchStats,
}

impl BatchReport {
    /// Results whose tools did not all succeed.
    pub fn failures(&self) -> impl Iterator<Item = &FileResult> {
        self.files.iter().filter(|f| !f.is_success())
    }
}
