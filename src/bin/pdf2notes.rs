//! CLI binary for pdf2notes.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `NarrationConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2notes::{
    narrate, narrate_to_file, DetailLevel, NarrationConfig, NarrationProgressCallback,
    OutputFormat, Pdf2NotesError, ProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit status for fatal document-open/extraction errors, distinguished from
/// the generic failure status 1. Per-slide generation errors never change
/// the exit status.
const EXIT_DOCUMENT_ERROR: i32 = 2;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live progress bar plus per-slide log lines.
/// Slides are processed sequentially, so events always arrive in order.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_run_start` (called once the deck has been opened and counted).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} slides  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Narrating");
        self.bar.reset_eta();
    }
}

impl NarrationProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Narrating {total_pages} slides…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("slide {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, chars: usize) {
        let note = if chars == 0 {
            dim("empty slide")
        } else {
            dim(&format!("{chars:>5} chars"))
        };
        self.bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            note,
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.len() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_pages: usize, generated: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} slides narrated ({} of them empty)",
                green("✔"),
                bold(&total_pages.to_string()),
                total_pages - generated,
            );
        } else {
            eprintln!(
                "{} {}/{} slides narrated  ({} failed)",
                if failed == total_pages {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&generated.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Narrate a whole deck (stdout, Markdown)
  pdf2notes slides.pdf

  # Write to a file
  pdf2notes slides.pdf -o notes.md

  # Specific slides, expansive narration
  pdf2notes --pages 1,3-5 --detail-level 2 slides.pdf -o notes.md

  # Use a specific model
  pdf2notes --model gemini-2.5-pro --provider gemini slides.pdf

  # Narrate a deck from a URL, plain-text output
  pdf2notes --format plain https://example.com/slides.pdf

  # JSON output for downstream tooling
  pdf2notes --format json slides.pdf > notes.json

  # Stay under a stricter free-tier quota
  pdf2notes --rpm 5 slides.pdf -o notes.md

EMPTY SLIDES:
  A slide with no extractable text and no embedded images is never sent to
  the backend; its section contains the literal marker [NO TEXT DETECTED].

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (preferred when set)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key

EXIT STATUS:
  0  run completed (individual slide failures do not change this)
  1  fatal error (bad selection, provider not configured, write failure)
  2  the document could not be opened or read at all
"#;

/// Generate per-slide presenter narration from PDF slide decks.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2notes",
    version,
    about = "Generate per-slide presenter narration from PDF slide decks using LLMs",
    long_about = "Extract each slide's text and embedded images from a PDF deck (local file or \
URL), send them slide by slide to a generative backend under a requests-per-minute ceiling, and \
assemble the responses into ordered presenter notes (Markdown, plain text, or JSON).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write the notes to this file instead of stdout.
    #[arg(short, long, env = "PDF2NOTES_OUTPUT")]
    output: Option<PathBuf>,

    /// Page selection: all, 5, 3-15, or 1,3,5-9.
    #[arg(long, env = "PDF2NOTES_PAGES", default_value = "all")]
    pages: String,

    /// LLM model ID (e.g. gemini-2.5-flash, gpt-4.1-mini).
    #[arg(long, env = "PDF2NOTES_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama.
    #[arg(
        long,
        env = "PDF2NOTES_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set\n\
          (GEMINI_API_KEY is preferred when present)."
    )]
    provider: Option<String>,

    /// Narration verbosity: 0 concise, 1 standard, 2 expansive.
    #[arg(long, env = "PDF2NOTES_DETAIL_LEVEL", default_value_t = 0,
          value_parser = clap::value_parser!(u8).range(0..=2))]
    detail_level: u8,

    /// Output format.
    #[arg(long, env = "PDF2NOTES_FORMAT", value_enum, default_value = "md")]
    format: FormatArg,

    /// Generation calls admitted per minute.
    #[arg(long, env = "PDF2NOTES_RPM", default_value_t = 10,
          value_parser = clap::value_parser!(u32).range(1..))]
    rpm: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2NOTES_PASSWORD")]
    password: Option<String>,

    /// Path to a text file replacing the built-in instruction text.
    #[arg(long, env = "PDF2NOTES_INSTRUCTIONS")]
    instructions: Option<PathBuf>,

    /// Max LLM output tokens per slide.
    #[arg(long, env = "PDF2NOTES_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDF2NOTES_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2NOTES_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "PDF2NOTES_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2NOTES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2NOTES_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Md,
    Plain,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Md => OutputFormat::Markdown,
            FormatArg::Plain => OutputFormat::Plain,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => {}
        Err(e) => {
            eprintln!("{} {e:#}", red("error:"));
            let code = match e.downcast_ref::<Pdf2NotesError>() {
                Some(err) if err.is_document_error() => EXIT_DOCUMENT_ERROR,
                _ => 1,
            };
            std::process::exit(code);
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let json_to_stdout = matches!(cli.format, FormatArg::Json) && cli.output.is_none();
    let show_progress = !cli.quiet && !cli.no_progress && !json_to_stdout;
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
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn NarrationProgressCallback>)
    } else {
        None
    };

    let config = build_config(cli, progress_cb).await?;

    // ── Run narration ────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = narrate_to_file(&cli.input, output_path, &config).await?;

        if !cli.quiet {
            eprintln!(
                "{}  {}/{} slides  {}ms  →  {}",
                if stats.failed_pages == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.generated_pages + stats.empty_pages,
                stats.selected_pages,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let output = narrate(&cli.input, &config).await?;

        let rendered = output.document.render(config.format)?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
        if !rendered.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }

        if !cli.quiet && !show_progress {
            eprintln!(
                "Narrated {}/{} slides in {}ms",
                output.stats.generated_pages + output.stats.empty_pages,
                output.stats.selected_pages,
                output.stats.total_duration_ms
            );
            if output.stats.failed_pages > 0 {
                eprintln!("  {} slides failed", output.stats.failed_pages);
            }
        }
    }

    Ok(())
}

/// Map CLI args to `NarrationConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<NarrationConfig> {
    let instructions = if let Some(ref path) = cli.instructions {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read instructions from {path:?}"))?,
        )
    } else {
        None
    };

    let detail = DetailLevel::from_index(cli.detail_level)
        .context("--detail-level must be 0, 1, or 2")?;

    let mut builder = NarrationConfig::builder()
        .pages(cli.pages.clone())
        .detail(detail)
        .format(cli.format.clone().into())
        .requests_per_minute(cli.rpm)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .download_timeout_secs(cli.download_timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    let mut config = builder.build().context("Invalid configuration")?;

    // Fields the builder setters can't express as unconditional calls.
    config.model = cli.model.clone();
    config.provider_name = cli.provider.clone();
    config.password = cli.password.clone();
    config.instructions = instructions;

    Ok(config)
}
