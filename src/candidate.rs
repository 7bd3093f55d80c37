//! Candidate filter and output naming.
//!
//! Idempotence across runs is encoded purely in file names: every OCR'd
//! derivative carries the [`OCR_PREFIX`], and the filter refuses any file
//! that already carries it. There is no tracking database.
//!
//! The filter looks only at the name of the file being examined. It does
//! not check whether `ocr-<name>` already exists next to an original, so a
//! second run reprocesses every original.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Prefix marking a file as OCR output.
pub const OCR_PREFIX: &str = "ocr-";

/// Extension (case-sensitive) a file must carry to be a candidate.
pub const PDF_SUFFIX: &str = ".pdf";

/// Why a file was not selected for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Name does not end with `.pdf`.
    NotPdf,
    /// Name starts with `ocr-`: this is a previous run's output.
    OcrOutput,
}

/// A file seen during traversal, with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// `None` when the file is a candidate.
    pub skip: Option<SkipReason>,
}

impl FileEntry {
    /// Classify `path` by its final component.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let skip = match path.file_name() {
            Some(name) => classify(&name.to_string_lossy()),
            None => Some(SkipReason::NotPdf),
        };
        Self { path, skip }
    }

    pub fn is_candidate(&self) -> bool {
        self.skip.is_none()
    }
}

/// Classify a bare file name. `None` means the file should be processed.
pub fn classify(name: &str) -> Option<SkipReason> {
    if !name.ends_with(PDF_SUFFIX) {
        Some(SkipReason::NotPdf)
    } else if name.starts_with(OCR_PREFIX) {
        Some(SkipReason::OcrOutput)
    } else {
        None
    }
}

/// `true` for `*.pdf` names without the `ocr-` prefix.
pub fn is_candidate(name: &str) -> bool {
    classify(name).is_none()
}

/// Sibling path the OCR tool writes to: `dir/ocr-<name>`.
pub fn ocr_output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(OCR_PREFIX);
    if let Some(file_name) = input.file_name() {
        name.push(file_name);
    }
    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Where `pdftotext <pdf>` puts its output when given no output argument.
///
/// A trailing `.pdf` or `.PDF` is replaced with `.txt`; any other name gets
/// `.txt` appended.
pub fn text_output_path(pdf: &Path) -> PathBuf {
    let name = pdf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name
        .strip_suffix(".pdf")
        .or_else(|| name.strip_suffix(".PDF"))
        .unwrap_or(&name);
    pdf.with_file_name(format!("{stem}.txt"))
}
