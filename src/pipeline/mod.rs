//! Pipeline stages for a batch OCR run.
//!
//! ```text
//! walk ──▶ filter ──▶ OCR tool ──▶ text tool
//! (tree)   (names)   (ocrmypdf)   (pdftotext)
//! ```
//!
//! 1. [`walk`]: enumerate every file under the root; blocking, so it runs
//!    in `spawn_blocking`
//! 2. filtering lives in [`crate::candidate`]
//! 3. [`tools`]: spawn the external commands one at a time and report how
//!    they exited

pub mod tools;
pub mod walk;
