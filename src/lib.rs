//! # pdf-ocr-batch
//!
//! Make a directory tree of scanned PDFs text-searchable.
//!
//! Every `*.pdf` under the root is passed to `ocrmypdf --skip-text`, which
//! writes an OCR'd copy named `ocr-<name>.pdf` next to the original; that copy
//! is then passed to `pdftotext`, which writes `ocr-<name>.txt` beside it.
//! Files already named `ocr-*` are never processed again, so the output of one
//! run is not fed back into the OCR engine by the next.
//!
//! ## Pipeline Overview
//!
//! ```text
//! root/
//!  │
//!  ├─ 1. Walk     every file below the root, sorted by name
//!  ├─ 2. Filter   keep *.pdf, drop ocr-*
//!  ├─ 3. OCR      ocrmypdf --skip-text a/x.pdf a/ocr-x.pdf
//!  ├─ 4. Extract  pdftotext a/ocr-x.pdf  →  a/ocr-x.txt
//!  └─ 5. Report   per-file outcome + batch stats
//! ```
//!
//! Files are processed one at a time. A tool that fails is recorded against
//! its file and the batch moves on.
//!
//! The produced `<root>/<year>/ocr-*.txt` reports can then be read back with
//! [`collect_reports`] and put to an LLM one by one with [`classify_report`],
//! which asks a single yes/no question per report.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_ocr_batch::{process_tree, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder().root("data/PFD_docs").build()?;
//!     let report = process_tree(&config).await?;
//!     eprintln!("{} ok / {} failed", report.stats.succeeded, report.stats.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-ocr-batch` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## External requirements
//!
//! `ocrmypdf` and `pdftotext` (poppler-utils) must be on `PATH`, or their
//! locations given through [`BatchConfig::ocr_tool`] / [`BatchConfig::text_tool`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod candidate;
pub mod classify;
pub mod config;
pub mod corpus;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use candidate::{is_candidate, ocr_output_path, text_output_path, FileEntry, SkipReason};
pub use classify::{
    classify_report, resolve_provider, ChatBackend, ClassifiedReport, ModelReply,
};
pub use config::{
    BatchConfig, BatchConfigBuilder, ClassifyConfig, ClassifyConfigBuilder, DEFAULT_MODEL,
    DEFAULT_ROOT,
};
pub use corpus::{collect_reports, ReportText};
pub use error::{BatchError, FileError, ReportError, ToolKind};
pub use output::{BatchReport, BatchStats, FileResult, PlannedFile};
pub use pipeline::tools::ToolSpec;
pub use process::{plan, process_file, process_tree, process_tree_sync};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
