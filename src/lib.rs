//! # pdf2notes
//!
//! Generate per-slide presenter narration from PDF slide decks using LLMs.
//!
//! ## Why this crate?
//!
//! Preparing a lecture from an existing deck means writing presenter notes
//! for every single slide — mechanical, slow, and easy to do badly under
//! time pressure. This crate extracts each slide's text and embedded images,
//! sends them to a generative backend one slide at a time under a
//! requests-per-minute ceiling (free-tier quotas are real), and assembles
//! the responses into an ordered notes document you can paste straight into
//! the presenter-notes field.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Select   parse the page-selection string ("1,3-5", "all", …)
//!  ├─ 3. Extract  per-slide text + embedded images via pdfium
//!  ├─ 4. Limit    minute-bucket admission control (default 10 calls/min)
//!  ├─ 5. Generate one sequential LLM call per non-empty slide
//!  └─ 6. Output   ordered document (Markdown / plain / JSON)
//! ```
//!
//! Slides with no text and no images never reach the backend: they get the
//! literal `[NO TEXT DETECTED]` sentinel. A backend failure on one slide is
//! recorded as that slide's outcome and the run continues.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2notes::{narrate, NarrationConfig, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
//!     let config = NarrationConfig::default();
//!     let output = narrate("slides.pdf", &config).await?;
//!     println!("{}", output.document.render(OutputFormat::Markdown)?);
//!     eprintln!(
//!         "{}/{} slides narrated, {} empty, {} failed",
//!         output.stats.generated_pages,
//!         output.stats.selected_pages,
//!         output.stats.empty_pages,
//!         output.stats.failed_pages,
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2notes` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2notes = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod narrate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    DetailLevel, NarrationConfig, NarrationConfigBuilder, OutputFormat, DEFAULT_MODEL,
    DEFAULT_REQUESTS_PER_MINUTE,
};
pub use error::{GenerationError, Pdf2NotesError};
pub use narrate::{narrate, narrate_sync, narrate_to_file};
pub use output::{
    write_document, GenerationOutcome, NarrationDocument, NarrationOutput, NarrationStats,
};
pub use pipeline::extract::PageContent;
pub use pipeline::generate::GenerationClient;
pub use pipeline::limiter::{Admission, Clock, RateLimiter, SystemClock};
pub use progress::{NarrationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompts::NO_TEXT_SENTINEL;
