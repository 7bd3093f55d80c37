//! Error types for the pdf-ocr-batch library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BatchError`]: **Fatal**: the run cannot proceed at all (missing root,
//!   unreadable directory, invalid configuration). Returned as
//!   `Err(BatchError)` from [`crate::process::process_tree`] and friends.
//!
//! * [`FileError`]: **Non-fatal**: an external tool failed for one file
//!   (non-zero exit, missing binary, timeout). Stored inside
//!   [`crate::output::FileResult`]; the batch moves on to the next file.
//!
//! * [`ReportError`]: **Non-fatal**: one report could not be classified
//!   (empty, or the LLM kept failing). The caller logs it and moves on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-ocr-batch library.
#[derive(Debug, Error)]
pub enum BatchError {
    // ── Root errors ───────────────────────────────────────────────────────
    /// The root directory does not exist.
    #[error("Root directory not found: '{path}'\nRun from the project directory or pass ROOT explicitly.")]
    RootNotFound { path: PathBuf },

    /// The root exists but is a regular file.
    #[error("Root '{path}' is not a directory")]
    RootNotADirectory { path: PathBuf },

    // ── Traversal errors ──────────────────────────────────────────────────
    /// A directory entry could not be read while walking the tree.
    #[error("Failed to walk '{path}': {source}")]
    WalkFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A produced text report could not be read.
    #[error("Failed to read report '{path}': {source}")]
    ReportReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No LLM provider could be set up (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<walkdir::Error> for BatchError {
    fn from(e: walkdir::Error) -> Self {
        let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
        let source = e
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        BatchError::WalkFailed { path, source }
    }
}

/// Which of the two external collaborators an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// The OCR engine (`ocrmypdf`).
    Ocr,
    /// The text extractor (`pdftotext`).
    Text,
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolKind::Ocr => f.write_str("OCR tool"),
            ToolKind::Text => f.write_str("text extractor"),
        }
    }
}

/// A non-fatal error for a single file.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum FileError {
    /// The program could not be started (not installed, not executable).
    #[error("{tool} '{program}' could not be started: {detail}")]
    SpawnFailed {
        tool: ToolKind,
        program: String,
        detail: String,
    },

    /// The program ran but exited unsuccessfully.
    #[error("{tool} exited with {}: {stderr}", exit_label(.exit_code))]
    ToolFailed {
        tool: ToolKind,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The program exceeded the configured per-tool timeout and was killed.
    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: ToolKind, secs: u64 },
}

impl FileError {
    /// The tool this error originated from.
    pub fn tool(&self) -> ToolKind {
        match self {
            FileError::SpawnFailed { tool, .. }
            | FileError::ToolFailed { tool, .. }
            | FileError::Timeout { tool, .. } => *tool,
        }
    }
}

/// A non-fatal error for a single report during classification.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum ReportError {
    /// The report holds only whitespace; nothing was sent to the model.
    #[error("Report '{path}' is empty")]
    Empty { path: PathBuf },

    /// Every attempt to query the model failed.
    #[error("Report '{path}': LLM call failed after {retries} retries: {detail}")]
    LlmFailed {
        path: PathBuf,
        retries: u32,
        detail: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no status (killed by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_not_found_display() {
        let e = BatchError::RootNotFound {
            path: PathBuf::from("data/PFD_docs"),
        };
        assert!(e.to_string().contains("data/PFD_docs"));
    }

    #[test]
    fn tool_failed_display_with_code() {
        let e = FileError::ToolFailed {
            tool: ToolKind::Ocr,
            exit_code: Some(6),
            stderr: "PriorOcrFoundError".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("OCR tool"), "got: {msg}");
        assert!(msg.contains("status 6"), "got: {msg}");
        assert!(msg.contains("PriorOcrFoundError"), "got: {msg}");
    }

    #[test]
    fn tool_failed_display_without_code() {
        let e = FileError::ToolFailed {
            tool: ToolKind::Text,
            exit_code: None,
            stderr: String::new(),
        };
        assert!(e.to_string().contains("killed by signal"));
    }

    #[test]
    fn timeout_display() {
        let e = FileError::Timeout {
            tool: ToolKind::Text,
            secs: 30,
        };
        assert_eq!(e.to_string(), "text extractor timed out after 30s");
        assert_eq!(e.tool(), ToolKind::Text);
    }

    #[test]
    fn file_error_serialises_tool_in_lowercase() {
        let e = FileError::SpawnFailed {
            tool: ToolKind::Ocr,
            program: "ocrmypdf".into(),
            detail: "No such file or directory".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"tool\":\"ocr\""), "got: {json}");
    }

    #[test]
    fn provider_not_configured_display() {
        let e = BatchError::ProviderNotConfigured {
            provider: "auto".into(),
            hint: "Set OPENAI_API_KEY".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'auto'"), "got: {msg}");
        assert!(msg.contains("OPENAI_API_KEY"), "got: {msg}");
    }

    #[test]
    fn llm_failed_display() {
        let e = ReportError::LlmFailed {
            path: PathBuf::from("2019/ocr-a.txt"),
            retries: 3,
            detail: "429 Too Many Requests".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("2019/ocr-a.txt"), "got: {msg}");
        assert!(msg.contains("after 3 retries"), "got: {msg}");
    }
}
