//! CLI binary for pdf-ocr-batch.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BatchConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_ocr_batch::{
    classify_report, collect_reports, plan, process_tree, resolve_provider, BatchConfig,
    BatchProgressCallback, ClassifyConfig, ProgressCallback, ReportError, ReportText, ToolSpec,
    DEFAULT_ROOT,
};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

/// Colour only when stderr is a terminal and `NO_COLOR` is unset.
fn colour_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none())
}

fn paint(code: &str, s: &str) -> String {
    if colour_enabled() {
        format!("\x1b[{code}m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

fn green(s: &str) -> String {
    paint("32", s)
}
fn red(s: &str) -> String {
    paint("31", s)
}
fn dim(s: &str) -> String {
    paint("2", s)
}
fn bold(s: &str) -> String {
    paint("1", s)
}
fn cyan(s: &str) -> String {
    paint("36", s)
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a progress bar plus one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the file currently being processed.
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Walking document tree…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("OCR");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_candidates: usize) {
        self.activate_bar(total_candidates);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_candidates} PDFs…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, path: &Path) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        self.bar.set_message(path.display().to_string());
        self.bar.println(format!("  Processing {}", path.display()));
    }

    fn on_file_complete(&self, index: usize, total: usize, path: &Path) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {:>4}/{:<4} {}  {}",
            green("✓"),
            index,
            total,
            path.display(),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, path: &Path, error: &str) {
        let secs = self.elapsed_secs();

        // Keep one line per file even when a tool dumps a traceback.
        let first_line = error.lines().next().unwrap_or_default();
        let msg = if first_line.chars().count() > 80 {
            let cut: String = first_line.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {:>4}/{:<4} {}  {}  {}",
            red("✗"),
            index,
            total,
            path.display(),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_candidates: usize, success_count: usize) {
        let failed = total_candidates.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} files processed successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files processed  ({} failed)",
                if failed == total_candidates {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_candidates,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # OCR everything under data/PFD_docs
  pdf-ocr-batch

  # Another tree
  pdf-ocr-batch ~/scans

  # See what would be processed
  pdf-ocr-batch --dry-run

  # Pass extra options to ocrmypdf
  pdf-ocr-batch --ocr-arg=-l --ocr-arg=eng+fra

  # Give up on a file after 10 minutes per tool
  pdf-ocr-batch --timeout 600

  # Machine-readable run summary
  pdf-ocr-batch --json > run.json

  # Dump extracted reports as JSON lines
  pdf-ocr-batch --list-reports > reports.jsonl

  # Ask an LLM the ambulance question about every report
  OPENAI_API_KEY=sk-... pdf-ocr-batch --classify > answers.jsonl

  # Same, another provider and question
  pdf-ocr-batch --classify --provider anthropic --model claude-sonnet-4-20250514 \
      --question 'Was the hospital at capacity? Answer YES or NO.'

OUTPUT NAMING:
  a/report.pdf  →  a/ocr-report.pdf  →  a/ocr-report.txt
  Files whose name starts with "ocr-" are never processed.
  Originals are re-processed on every run.

EXIT STATUS:
  0 when the tree was walked, even if ocrmypdf or pdftotext failed on
  some files (failures are listed on stderr). Non-zero only when the
  root is missing or unreadable, or no LLM provider is configured for
  --classify.

ENVIRONMENT (--classify):
  OPENAI_API_KEY          OpenAI (default provider, model gpt-4-turbo)
  ANTHROPIC_API_KEY       Anthropic
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID

REQUIREMENTS:
  ocrmypdf   https://ocrmypdf.readthedocs.io
  pdftotext  poppler-utils
"#;

/// OCR a tree of PDFs with ocrmypdf and extract their text with pdftotext.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-ocr-batch",
    version,
    about = "OCR a tree of PDFs with ocrmypdf and extract text with pdftotext",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory to walk recursively.
    #[arg(env = "PDF_OCR_BATCH_ROOT", default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// OCR program.
    #[arg(long, env = "PDF_OCR_BATCH_OCR_PROGRAM", default_value = "ocrmypdf")]
    ocr_program: String,

    /// Extra argument for the OCR program (repeatable).
    #[arg(long = "ocr-arg", allow_hyphen_values = true)]
    ocr_args: Vec<String>,

    /// Text extraction program.
    #[arg(long, env = "PDF_OCR_BATCH_TEXT_PROGRAM", default_value = "pdftotext")]
    text_program: String,

    /// Extra argument for the text extraction program (repeatable).
    #[arg(long = "text-arg", allow_hyphen_values = true)]
    text_args: Vec<String>,

    /// Per-tool timeout in seconds (default: none).
    #[arg(long, env = "PDF_OCR_BATCH_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// List candidates and their output paths without running any tool.
    #[arg(long, env = "PDF_OCR_BATCH_DRY_RUN")]
    dry_run: bool,

    /// Print every <root>/<year>/ocr-*.txt as one JSON object per line.
    #[arg(long, conflicts_with = "classify")]
    list_reports: bool,

    /// Ask an LLM a yes/no question about every <root>/<year>/ocr-*.txt and
    /// print each report with its answer as one JSON object per line.
    #[arg(long, conflicts_with = "dry_run")]
    classify: bool,

    /// LLM provider for --classify: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider for --classify. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama."
    )]
    provider: Option<String>,

    /// LLM model ID for --classify (default: gpt-4-turbo).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Question asked about each report instead of the ambulance question.
    #[arg(long, env = "PDF_OCR_BATCH_QUESTION")]
    question: Option<String>,

    /// Retries per report when the LLM call fails.
    #[arg(long, env = "PDF_OCR_BATCH_MAX_RETRIES", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(0..=10))]
    max_retries: u32,

    /// Print the run report as JSON instead of a summary.
    #[arg(long, env = "PDF_OCR_BATCH_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF_OCR_BATCH_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_OCR_BATCH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF_OCR_BATCH_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // indicatif draws nothing when stderr is not a terminal, so redirected
    // runs get the per-file INFO lines instead of the bar. With the bar
    // shown, those lines would only duplicate its own.
    let interactive = io::stderr().is_terminal();
    let show_progress = interactive
        && !cli.quiet
        && !cli.no_progress
        && !cli.json
        && !cli.list_reports
        && !cli.classify
        && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .with_ansi(colour_enabled())
        .init();

    // ── Report listing mode ──────────────────────────────────────────────
    if cli.list_reports {
        return list_reports(&cli.root).await;
    }

    // ── Classification mode ──────────────────────────────────────────────
    if cli.classify {
        return classify(&cli).await;
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        let planned = plan(&config)
            .await
            .with_context(|| format!("Failed to scan {}", cli.root.display()))?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&planned).context("Failed to serialise plan")?
            );
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for p in &planned {
                writeln!(handle, "{}  →  {}", p.source.display(), p.ocr_path.display())
                    .context("Failed to write to stdout")?;
            }
            if !cli.quiet {
                eprintln!("{} candidates", planned.len());
            }
        }
        return Ok(());
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let report = process_tree(&config)
        .await
        .with_context(|| format!("Failed to process {}", cli.root.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet {
        let s = &report.stats;
        if !show_progress {
            eprintln!(
                "Processed {}/{} PDFs in {}ms",
                s.succeeded, s.candidates, s.total_duration_ms
            );
        }
        eprintln!(
            "   {} files seen  /  {} skipped (ocr- output)  /  {} skipped (not PDF)",
            dim(&s.files_seen.to_string()),
            dim(&s.skipped_ocr_output.to_string()),
            dim(&s.skipped_not_pdf.to_string()),
        );
    }
    for failed in report.failures() {
        eprintln!("{} {}", red("✗"), bold(&failed.source.display().to_string()));
        for e in &failed.errors {
            eprintln!("    {e}");
        }
    }

    Ok(())
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .root(cli.root.clone())
        .ocr_tool(ToolSpec::new(&cli.ocr_program).args(cli.ocr_args.iter().cloned()))
        .text_tool(ToolSpec::new(&cli.text_program).args(cli.text_args.iter().cloned()))
        .dry_run(cli.dry_run);

    if let Some(secs) = cli.timeout {
        builder = builder.tool_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Map CLI args to `ClassifyConfig`.
fn build_classify_config(cli: &Cli) -> Result<ClassifyConfig> {
    let mut builder = ClassifyConfig::builder().max_retries(cli.max_retries);
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref question) = cli.question {
        builder = builder.question(question);
    }
    builder.build().context("Invalid configuration")
}

/// Read every report under `root` off the async worker threads.
async fn load_reports(root: &Path) -> Result<Vec<ReportText>> {
    let root_buf = root.to_path_buf();
    tokio::task::spawn_blocking(move || collect_reports(&root_buf))
        .await
        .context("Report loader panicked")?
        .with_context(|| format!("Failed to read reports under {}", root.display()))
}

/// `--classify`: one JSON object per classified report on stdout.
///
/// Empty reports and reports the model kept failing on are reported on
/// stderr and skipped.
async fn classify(cli: &Cli) -> Result<()> {
    let config = build_classify_config(cli)?;
    let provider = resolve_provider(&config).context("Failed to set up the LLM provider")?;
    let reports = load_reports(&cli.root).await?;

    let (mut yes, mut no, mut other, mut skipped) = (0usize, 0usize, 0usize, 0usize);
    let stdout = io::stdout();
    for report in &reports {
        match classify_report(&provider, report, &config).await {
            Ok(classified) => {
                match classified.answer() {
                    Some(true) => yes += 1,
                    Some(false) => no += 1,
                    None => other += 1,
                }
                let line =
                    serde_json::to_string(&classified).context("Failed to serialise report")?;
                let mut handle = stdout.lock();
                writeln!(handle, "{line}").context("Failed to write to stdout")?;
                handle.flush().context("Failed to write to stdout")?;
            }
            Err(ReportError::Empty { path }) => {
                skipped += 1;
                eprintln!("EMPTY FILE {}", path.display());
            }
            Err(e) => {
                skipped += 1;
                eprintln!("{} {e}", red("✗"));
            }
        }
    }

    if !cli.quiet {
        eprintln!(
            "{} reports: {} yes / {} no / {} other / {} skipped",
            bold(&reports.len().to_string()),
            green(&yes.to_string()),
            no,
            dim(&other.to_string()),
            red(&skipped.to_string()),
        );
    }
    Ok(())
}

/// `--list-reports`: one JSON object per report on stdout.
async fn list_reports(root: &Path) -> Result<()> {
    let reports = load_reports(root).await?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for report in &reports {
        if report.is_empty() {
            eprintln!("EMPTY FILE {}", report.path.display());
            continue;
        }
        let line = serde_json::to_string(report).context("Failed to serialise report")?;
        writeln!(handle, "{line}").context("Failed to write to stdout")?;
    }
    Ok(())
}
