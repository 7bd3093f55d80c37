//! External tool invocation.
//!
//! Both collaborators are opaque commands. Arguments are handed to the
//! process as a vector, never through a shell, so paths containing spaces
//! or quotes reach the tool intact.

use crate::error::{FileError, ToolKind};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Upper bound on the stderr text kept in a [`FileError::ToolFailed`].
const MAX_STDERR_CHARS: usize = 2000;

/// A program plus fixed leading arguments.
///
/// The per-file arguments are appended after `args`, so
/// `ToolSpec::new("sh").arg("fake-ocr.sh")` runs a script in place of the
/// real binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// One fully-resolved command line.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tool: ToolKind,
    pub program: String,
    pub args: Vec<OsString>,
}

/// `ocrmypdf [--skip-text] <input> <output>`
pub fn ocr_invocation(
    tool: &ToolSpec,
    skip_text: bool,
    input: &Path,
    output: &Path,
) -> Invocation {
    let mut args: Vec<OsString> = tool.args.iter().map(OsString::from).collect();
    if skip_text {
        args.push("--skip-text".into());
    }
    args.push(input.as_os_str().to_owned());
    args.push(output.as_os_str().to_owned());
    Invocation {
        tool: ToolKind::Ocr,
        program: tool.program.clone(),
        args,
    }
}

/// `pdftotext <pdf>`: output name is left to the tool.
pub fn text_invocation(tool: &ToolSpec, pdf: &Path) -> Invocation {
    let mut args: Vec<OsString> = tool.args.iter().map(OsString::from).collect();
    args.push(pdf.as_os_str().to_owned());
    Invocation {
        tool: ToolKind::Text,
        program: tool.program.clone(),
        args,
    }
}

impl Invocation {
    /// Human-readable command line for logs.
    pub fn command_line(&self) -> String {
        let mut s = self.program.clone();
        for a in &self.args {
            s.push(' ');
            s.push_str(&a.to_string_lossy());
        }
        s
    }

    /// Run to completion, blocking the caller until the child exits.
    ///
    /// With `timeout_secs` set, a child that outlives it is killed and
    /// [`FileError::Timeout`] is returned.
    pub async fn run(&self, timeout_secs: Option<u64>) -> Result<(), FileError> {
        debug!("Running: {}", self.command_line());

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FileError::SpawnFailed {
                tool: self.tool,
                program: self.program.clone(),
                detail: e.to_string(),
            })?;

        let output = match timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output())
                    .await
                {
                    Ok(res) => res,
                    // The child was consumed by wait_with_output and is killed on drop.
                    Err(_) => {
                        return Err(FileError::Timeout {
                            tool: self.tool,
                            secs,
                        })
                    }
                }
            }
            None => child.wait_with_output().await,
        }
        .map_err(|e| FileError::SpawnFailed {
            tool: self.tool,
            program: self.program.clone(),
            detail: format!("failed to wait for child: {e}"),
        })?;

        if output.status.success() {
            return Ok(());
        }

        Err(FileError::ToolFailed {
            tool: self.tool,
            exit_code: output.status.code(),
            stderr: tail_chars(String::from_utf8_lossy(&output.stderr).trim(), MAX_STDERR_CHARS),
        })
    }
}

/// Keep the last `max` characters; tools print the useful part of an error last.
fn tail_chars(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - max).collect();
    format!("\u{2026}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn ocr_invocation_places_skip_text_before_paths() {
        let inv = ocr_invocation(
            &ToolSpec::new("ocrmypdf"),
            true,
            Path::new("a/report.pdf"),
            Path::new("a/ocr-report.pdf"),
        );
        assert_eq!(inv.tool, ToolKind::Ocr);
        assert_eq!(
            inv.command_line(),
            "ocrmypdf --skip-text a/report.pdf a/ocr-report.pdf"
        );
    }

    #[test]
    fn ocr_invocation_without_skip_text() {
        let inv = ocr_invocation(
            &ToolSpec::new("ocrmypdf").arg("-l").arg("eng"),
            false,
            Path::new("x.pdf"),
            Path::new("ocr-x.pdf"),
        );
        assert_eq!(inv.command_line(), "ocrmypdf -l eng x.pdf ocr-x.pdf");
    }

    #[test]
    fn text_invocation_passes_only_the_pdf() {
        let inv = text_invocation(&ToolSpec::new("pdftotext"), Path::new("a/ocr-r.pdf"));
        assert_eq!(inv.tool, ToolKind::Text);
        assert_eq!(inv.args, vec![OsString::from("a/ocr-r.pdf")]);
    }

    #[test]
    fn path_with_spaces_stays_one_argument() {
        let p = PathBuf::from("my docs/the report.pdf");
        let inv = text_invocation(&ToolSpec::new("pdftotext"), &p);
        assert_eq!(inv.args.len(), 1);
        assert_eq!(inv.args[0].as_os_str(), p.as_os_str());
    }

    #[test]
    fn tail_chars_keeps_end() {
        assert_eq!(tail_chars("short", 10), "short");
        assert_eq!(tail_chars("abcdef", 3), "\u{2026}def");
    }

    #[tokio::test]
    async fn missing_program_is_spawn_failure() {
        let inv = text_invocation(
            &ToolSpec::new("definitely-not-a-real-binary-4f1c"),
            Path::new("x.pdf"),
        );
        let err = inv.run(None).await.unwrap_err();
        assert!(matches!(err, FileError::SpawnFailed { tool: ToolKind::Text, .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_captures_stderr() {
        let sh = ToolSpec::new("sh").arg("-c").arg("echo broken pdf >&2; exit 3").arg("sh");
        let inv = text_invocation(&sh, Path::new("x.pdf"));
        match inv.run(None).await.unwrap_err() {
            FileError::ToolFailed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr, "broken pdf");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_tool_times_out() {
        let sh = ToolSpec::new("sh").arg("-c").arg("sleep 5").arg("sh");
        let inv = text_invocation(&sh, Path::new("x.pdf"));
        let err = inv.run(Some(1)).await.unwrap_err();
        assert!(matches!(err, FileError::Timeout { secs: 1, .. }));
    }
}
