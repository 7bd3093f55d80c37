//! Loader for the text reports a batch run leaves behind.
//!
//! The document tree is organised as `<root>/<year>/<file>`. After a run,
//! every year directory holds `ocr-<name>.txt` files next to the PDFs. This
//! module reads them back for downstream analysis, one level deep: files
//! directly under `root` and directories below a year are ignored.

use crate::candidate::OCR_PREFIX;
use crate::error::BatchError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One extracted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportText {
    /// Name of the year directory the report sits in.
    pub year: String,
    /// File name, e.g. `ocr-2019-0042.txt`.
    pub name: String,
    /// `name` without the `ocr-` prefix and `.txt` suffix, e.g. `2019-0042`.
    pub original_name_root: String,
    /// The PDF this report was derived from, e.g. `2019-0042.pdf`.
    pub original_pdf_name: String,
    pub path: PathBuf,
    pub contents: String,
}

impl ReportText {
    /// True when extraction produced only whitespace (typically an image
    /// PDF whose OCR step failed).
    pub fn is_empty(&self) -> bool {
        self.contents.trim().is_empty()
    }
}

/// `true` for `ocr-*.txt`.
pub fn is_report_name(name: &str) -> bool {
    name.starts_with(OCR_PREFIX) && name.ends_with(".txt")
}

/// Read every `<root>/<year>/ocr-*.txt`, sorted by year then name.
///
/// Blocking.
pub fn collect_reports(root: &Path) -> Result<Vec<ReportText>, BatchError> {
    crate::pipeline::walk::check_root(root)?;

    let mut years = read_dir_sorted(root)?;
    years.retain(|p| p.is_dir());

    let mut reports = Vec::new();
    for year_dir in years {
        let year = file_name(&year_dir);
        for path in read_dir_sorted(&year_dir)? {
            let name = file_name(&path);
            if !path.is_file() || !is_report_name(&name) {
                continue;
            }
            // pdftotext may be configured for a non-UTF-8 encoding.
            let bytes = std::fs::read(&path).map_err(|e| BatchError::ReportReadFailed {
                path: path.clone(),
                source: e,
            })?;
            let contents = String::from_utf8_lossy(&bytes).into_owned();
            let original_name_root = name
                .strip_prefix(OCR_PREFIX)
                .and_then(|n| n.strip_suffix(".txt"))
                .unwrap_or(&name)
                .to_string();
            debug!("Loaded report {} ({} bytes)", path.display(), contents.len());
            reports.push(ReportText {
                year: year.clone(),
                original_pdf_name: format!("{original_name_root}.pdf"),
                original_name_root,
                name,
                path,
                contents,
            });
        }
    }
    Ok(reports)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let walk_err = |e: std::io::Error| BatchError::WalkFailed {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut paths = std::fs::read_dir(dir)
        .map_err(walk_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(walk_err)?;
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, contents: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, contents).unwrap();
    }

    #[test]
    fn report_name_filter() {
        assert!(is_report_name("ocr-a.txt"));
        assert!(!is_report_name("a.txt"));
        assert!(!is_report_name("ocr-a.pdf"));
    }

    #[test]
    fn collects_reports_by_year() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "2020/ocr-b.txt", "second");
        write(dir.path(), "2019/ocr-a.txt", "first");
        write(dir.path(), "2019/a.pdf", "%PDF");
        write(dir.path(), "2019/a.txt", "not a report");
        write(dir.path(), "2019/nested/ocr-deep.txt", "ignored");
        write(dir.path(), "ocr-top.txt", "ignored");

        let reports = collect_reports(dir.path()).unwrap();
        assert_eq!(reports.len(), 2);

        assert_eq!(reports[0].year, "2019");
        assert_eq!(reports[0].name, "ocr-a.txt");
        assert_eq!(reports[0].original_name_root, "a");
        assert_eq!(reports[0].original_pdf_name, "a.pdf");
        assert_eq!(reports[0].contents, "first");

        assert_eq!(reports[1].year, "2020");
        assert_eq!(reports[1].contents, "second");
    }

    #[test]
    fn whitespace_only_report_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "2021/ocr-blank.txt", " \n\x0c\n");
        let reports = collect_reports(dir.path()).unwrap();
        assert!(reports[0].is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            collect_reports(&dir.path().join("gone")),
            Err(BatchError::RootNotFound { .. })
        ));
    }
}
