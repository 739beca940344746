//! Output types: per-slide outcomes, the assembled document, run stats,
//! and rendering/writing to a file or stdout.
//!
//! The document accumulates exactly one [`GenerationOutcome`] per selected
//! slide. A `BTreeMap` keyed by page number makes ascending iteration a
//! structural property — renderers never sort, they just iterate.

use crate::config::OutputFormat;
use crate::error::Pdf2NotesError;
use crate::prompts::NO_TEXT_SENTINEL;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// The result of processing one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationOutcome {
    /// The backend produced narration text.
    Text(String),
    /// The slide had no extractable text and no embedded images; the backend
    /// was never called.
    Empty,
    /// The backend call failed. The message is the opaque provider error.
    Error(String),
}

impl GenerationOutcome {
    /// Render the outcome as the string that appears in the output document.
    pub fn render(&self) -> String {
        match self {
            GenerationOutcome::Text(text) => text.clone(),
            GenerationOutcome::Empty => NO_TEXT_SENTINEL.to_string(),
            GenerationOutcome::Error(message) => format!("[ERROR] {message}"),
        }
    }
}

/// Ordered mapping from page number (1-indexed) to its outcome.
///
/// Owned exclusively by the pipeline while a run is in flight; handed over
/// whole to the output writer afterwards. Each page is inserted exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrationDocument {
    outcomes: BTreeMap<usize, GenerationOutcome>,
}

impl NarrationDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for a page. Later inserts for the same page are a
    /// bug in the caller; the first outcome wins and the duplicate is logged.
    pub fn insert(&mut self, page_num: usize, outcome: GenerationOutcome) {
        use std::collections::btree_map::Entry;
        match self.outcomes.entry(page_num) {
            Entry::Vacant(slot) => {
                slot.insert(outcome);
            }
            Entry::Occupied(_) => {
                debug!("Duplicate outcome for page {page_num} ignored");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, page_num: usize) -> Option<&GenerationOutcome> {
        self.outcomes.get(&page_num)
    }

    /// Iterate outcomes in ascending page order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &GenerationOutcome)> {
        self.outcomes.iter().map(|(page, outcome)| (*page, outcome))
    }

    /// Render the whole document in the requested format.
    pub fn render(&self, format: OutputFormat) -> Result<String, Pdf2NotesError> {
        match format {
            OutputFormat::Markdown => Ok(self.render_markdown()),
            OutputFormat::Plain => Ok(self.render_plain()),
            OutputFormat::Json => self.render_json(),
        }
    }

    /// `## Slide N` heading, narration body, `---` separator per slide.
    fn render_markdown(&self) -> String {
        let mut out = String::new();
        for (page, outcome) in self.iter() {
            out.push_str(&format!("## Slide {page}\n\n"));
            out.push_str(&outcome.render());
            out.push_str("\n\n---\n\n");
        }
        out
    }

    /// `--- Slide N ---` heading and a blank line per slide.
    fn render_plain(&self) -> String {
        let mut out = String::new();
        for (page, outcome) in self.iter() {
            out.push_str(&format!("--- Slide {page} ---\n"));
            out.push_str(&outcome.render());
            out.push_str("\n\n");
        }
        out
    }

    /// Flat JSON object: page number (as key) to rendered text.
    ///
    /// BTreeMap iteration order carries through serde_json, so keys appear
    /// in ascending page order in the pretty-printed output too.
    fn render_json(&self) -> Result<String, Pdf2NotesError> {
        let flat: BTreeMap<usize, String> = self
            .iter()
            .map(|(page, outcome)| (page, outcome.render()))
            .collect();
        serde_json::to_string_pretty(&flat)
            .map_err(|e| Pdf2NotesError::Internal(format!("JSON serialisation failed: {e}")))
    }
}

/// Aggregate counters for one narration run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrationStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages selected for narration.
    pub selected_pages: usize,
    /// Slides with backend-generated narration.
    pub generated_pages: usize,
    /// Slides skipped as empty (sentinel emitted, no backend call).
    pub empty_pages: usize,
    /// Slides whose backend call failed.
    pub failed_pages: usize,
    /// Wall-clock duration of the whole run, including limiter waits.
    pub total_duration_ms: u64,
}

/// A finished run: the ordered document plus its stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationOutput {
    pub document: NarrationDocument,
    pub stats: NarrationStats,
}

/// Write a rendered document to `path`, or to stdout when `path` is `None`.
///
/// File writes go through a temp file + rename so a crash mid-write never
/// leaves a truncated output file behind.
pub fn write_document(
    document: &NarrationDocument,
    format: OutputFormat,
    path: Option<&Path>,
) -> Result<(), Pdf2NotesError> {
    let rendered = document.render(format)?;

    match path {
        Some(path) => {
            write_atomic(path, &rendered)?;
            info!("Output written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .map_err(|e| Pdf2NotesError::OutputWriteFailed {
                    path: "<stdout>".into(),
                    source: e,
                })?;
            if !rendered.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }

    Ok(())
}

fn write_atomic(path: &Path, content: &str) -> Result<(), Pdf2NotesError> {
    let map_err = |e: std::io::Error| Pdf2NotesError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(map_err)?;
        }
    }

    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, content).map_err(map_err)?;
    std::fs::rename(&tmp_path, path).map_err(map_err)
}
