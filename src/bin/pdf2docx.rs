//! CLI binary for pdf2docx.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, runs the batch and reports the outcome.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2docx::{
    run_batch, BatchPolicy, ConversionConfig, ConversionProgressCallback, DocumentLabels,
    ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar reused for each document in turn.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS)
    }

    /// Switch to the full bar once the page count is known.
    fn activate_bar(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.reset_eta();
    }

    /// Stop the steady tick and erase the bar before the summary prints.
    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_document_start(&self, source: &Path) {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.reset();
        self.bar.set_length(0);
        self.bar.set_style(Self::spinner_style());
        self.bar.set_prefix(name);
        self.bar.set_message("Rasterising…");
    }

    fn on_page_start(&self, page_num: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.activate_bar(total);
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, _page_num: usize, _total: usize, _text_len: usize) {
        self.bar.inc(1);
    }

    fn on_document_complete(&self, output: &Path, total_pages: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            bold(&output.display().to_string()),
            dim(&format!("{total_pages} pages")),
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one scan (Spanish OCR, 300 DPI) into the current directory
  pdf2docx scan.pdf

  # Several files, English OCR, into ./out
  pdf2docx -l eng -o out a.pdf b.pdf c.pdf

  # Faster, lower-quality OCR
  pdf2docx -d 150 scan.pdf

  # Spanish headings ("Tabla de Contenidos", "Página N")
  pdf2docx --labels es informe.pdf

  # Machine-readable batch report
  pdf2docx --json -o out *.pdf > report.json

ENVIRONMENT VARIABLES:
  PDF2DOCX_OUTPUT_DIR   Default for --output-dir
  PDF2DOCX_DPI          Default for --dpi
  PDF2DOCX_LANG         Default for --lang
  TESSERACT_CMD         tesseract executable (default: tesseract on PATH)
  PDFIUM_LIB_PATH       Directory containing libpdfium
  RUST_LOG              Log filter (overrides --quiet)

REQUIREMENTS:
  tesseract with the language data for --lang (e.g. tesseract-ocr-spa)
  libpdfium in PDFIUM_LIB_PATH, the current directory, or the system library path
"#;

/// Convert scanned PDFs to Word documents with a table of contents.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2docx",
    version,
    about = "Convert scanned PDFs to .docx via OCR, with a table of contents",
    long_about = "Rasterise each page of one or more scanned PDFs, run tesseract OCR on it, and \
write the text to a .docx file with one \"Page N\" section per page and a table-of-contents \
field that the word processor fills in on open.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files to convert.
    #[arg(required = true)]
    pdfs: Vec<PathBuf>,

    /// Directory for the .docx files (created if missing).
    #[arg(short, long, env = "PDF2DOCX_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Rendering DPI.
    #[arg(short, long, env = "PDF2DOCX_DPI", default_value_t = 300)]
    dpi: u32,

    /// OCR language code (tesseract -l).
    #[arg(short, long, env = "PDF2DOCX_LANG", default_value = "spa")]
    lang: String,

    /// Only informational and error logs (no per-page debug lines).
    #[arg(short, long)]
    quiet: bool,

    /// Language of headings written into the document.
    #[arg(long, value_enum, default_value = "en")]
    labels: LabelsArg,

    /// tesseract executable.
    #[arg(long = "tesseract", env = "TESSERACT_CMD", default_value = "tesseract")]
    tesseract_cmd: String,

    /// Directory containing the pdfium shared library.
    #[arg(long = "pdfium-lib", env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Stop the batch when rasterisation or OCR fails.
    #[arg(long)]
    halt_on_error: bool,

    /// Do not ask the word processor to refresh fields on open.
    #[arg(long)]
    no_update_fields: bool,

    /// Show a progress bar (hides info logs).
    #[arg(long)]
    progress: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LabelsArg {
    En,
    Es,
}

impl From<LabelsArg> for DocumentLabels {
    fn from(v: LabelsArg) -> Self {
        match v {
            LabelsArg::En => DocumentLabels::english(),
            LabelsArg::Es => DocumentLabels::spanish(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress_bar = cli.progress.then(CliProgressCallback::new);
    let progress_cb = progress_bar
        .clone()
        .map(|cb| cb as Arc<dyn ConversionProgressCallback>);

    let config = build_config(&cli, progress_cb)?;

    // ── Logging setup ────────────────────────────────────────────────────
    // With a progress bar only errors are logged; the bar shows the rest.
    let filter = if cli.progress {
        "error"
    } else {
        config.log_filter()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let policy = if cli.halt_on_error {
        BatchPolicy::HaltOnPipelineFailure
    } else {
        BatchPolicy::IsolateFailures
    };

    let report = run_batch(&cli.pdfs, &cli.output_dir, &config, policy).await;
    if let Some(ref bar) = progress_bar {
        bar.finish();
    }
    let report = report.context("Batch conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report.summary())
                .context("Failed to serialise batch report")?
        );
    } else if cli.progress {
        let failed = report.failed();
        eprintln!(
            "{} {} converted, {} failed",
            if failed == 0 { green("✔") } else { red("✘") },
            bold(&report.succeeded().to_string()),
            failed,
        );
    }

    // Per-document failures are reported, not turned into a failing exit code.
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .language(cli.lang.clone())
        .verbose(!cli.quiet)
        .labels(cli.labels.into())
        .update_fields_on_open(!cli.no_update_fields)
        .tesseract_cmd(cli.tesseract_cmd.clone());

    if let Some(ref dir) = cli.pdfium_lib {
        builder = builder.pdfium_lib_dir(dir.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_is_cleared_when_finished() {
        let cb = CliProgressCallback::new();
        cb.on_document_start(Path::new("scan.pdf"));
        cb.on_page_start(1, 2);
        cb.on_page_complete(1, 2, 10);
        assert!(!cb.bar.is_finished());

        cb.finish();
        assert!(cb.bar.is_finished());
    }

    #[test]
    fn quiet_flag_turns_off_verbose() {
        let cli = Cli::parse_from(["pdf2docx", "-q", "a.pdf"]);
        let config = build_config(&cli, None).unwrap();
        assert!(!config.verbose);
        assert_eq!(config.log_filter(), "info");
    }
}
