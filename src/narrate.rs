//! Narration entry points: drive the whole pipeline for one deck.
//!
//! The run is strictly sequential: slides are processed one at a time in
//! ascending page order. The only suspension points are backend I/O and the
//! rate limiter's wait-for-next-minute. Everything slide-scoped is contained
//! — one failed backend call becomes that slide's outcome, never the run's.

use crate::config::NarrationConfig;
use crate::error::Pdf2NotesError;
use crate::output::{GenerationOutcome, NarrationDocument, NarrationOutput, NarrationStats};
use crate::pipeline::extract::PageContent;
use crate::pipeline::generate::{resolve_client, GenerationClient};
use crate::pipeline::limiter::{Clock, RateLimiter, SystemClock};
use crate::pipeline::{extract, input, select};
use crate::prompts;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Narrate a slide-deck PDF (local path or URL).
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(NarrationOutput)` whenever the document could be opened and the
/// selection was valid — even if some (or all) backend calls failed. Check
/// `output.stats.failed_pages` for partial failures.
///
/// # Errors
/// Returns `Err(Pdf2NotesError)` only for fatal faults: unreadable or
/// corrupt document, invalid page selection, unconfigured provider.
pub async fn narrate(
    input_str: impl AsRef<str>,
    config: &NarrationConfig,
) -> Result<NarrationOutput, Pdf2NotesError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting narration: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();

    // ── Step 2: Resolve the generation client ────────────────────────────
    let client = resolve_client(config)?;

    // ── Step 3: Page count and selection ─────────────────────────────────
    let total_pages = extract::page_count(&pdf_path, config.password.as_deref()).await?;
    info!("PDF has {} pages", total_pages);

    let selection = select::parse_selection(config.pages.as_deref(), total_pages)?;
    debug!("Selected {} pages for narration", selection.len());

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(selection.len());
    }

    // ── Step 4: Extract per-page content ─────────────────────────────────
    let contents =
        extract::extract_pages(&pdf_path, config.password.as_deref(), &selection).await?;

    // ── Step 5: Generate, rate-limited, in ascending page order ──────────
    let instructions = prompts::instructions_for(config.detail, config.instructions.as_deref());
    let mut limiter = RateLimiter::new(config.requests_per_minute);

    let document = process_pages(
        &contents,
        &instructions,
        client.as_ref(),
        &mut limiter,
        &SystemClock,
        config,
    )
    .await;

    // ── Step 6: Stats ────────────────────────────────────────────────────
    let generated = document
        .iter()
        .filter(|(_, o)| matches!(o, GenerationOutcome::Text(_)))
        .count();
    let empty = document
        .iter()
        .filter(|(_, o)| matches!(o, GenerationOutcome::Empty))
        .count();
    let failed = document
        .iter()
        .filter(|(_, o)| matches!(o, GenerationOutcome::Error(_)))
        .count();

    let stats = NarrationStats {
        total_pages,
        selected_pages: selection.len(),
        generated_pages: generated,
        empty_pages: empty,
        failed_pages: failed,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Narration complete: {}/{} slides generated, {} empty, {} failed, {}ms",
        generated,
        stats.selected_pages,
        empty,
        failed,
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(stats.selected_pages, generated);
    }

    Ok(NarrationOutput { document, stats })
}

/// Narrate a deck and write the rendered document directly to a file.
///
/// Uses the atomic write path of [`crate::output::write_document`].
pub async fn narrate_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &NarrationConfig,
) -> Result<NarrationStats, Pdf2NotesError> {
    let output = narrate(input_str, config).await?;
    crate::output::write_document(&output.document, config.format, Some(output_path.as_ref()))?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`narrate`].
///
/// Creates a temporary tokio runtime internally.
pub fn narrate_sync(
    input_str: impl AsRef<str>,
    config: &NarrationConfig,
) -> Result<NarrationOutput, Pdf2NotesError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2NotesError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(narrate(input_str, config))
}

/// The per-slide loop, split out so tests can drive it with synthetic
/// content, a scripted client, and a fake clock.
///
/// Per slide, in the order given (ascending by construction):
/// * empty content ⇒ [`GenerationOutcome::Empty`], no limiter admission,
///   no backend call;
/// * otherwise one `admit()` (which may sleep out a saturated minute) and
///   one `generate()`; success ⇒ `Text`, failure ⇒ `Error` and the loop
///   continues.
///
/// Exactly one outcome is inserted per slide.
pub async fn process_pages(
    contents: &[PageContent],
    instructions: &str,
    client: &dyn GenerationClient,
    limiter: &mut RateLimiter,
    clock: &dyn Clock,
    config: &NarrationConfig,
) -> NarrationDocument {
    let total = contents.len();
    let mut document = NarrationDocument::new();

    for content in contents {
        let page_num = content.page_num;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total);
        }

        if content.is_empty() {
            debug!("Page {page_num}: empty slide, emitting sentinel without a backend call");
            document.insert(page_num, GenerationOutcome::Empty);
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_complete(page_num, total, 0);
            }
            continue;
        }

        limiter.admit(clock).await;

        match client.generate(instructions, content).await {
            Ok(text) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_complete(page_num, total, text.len());
                }
                document.insert(page_num, GenerationOutcome::Text(text));
            }
            Err(e) => {
                warn!("Page {page_num}: generation failed — {e}");
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, total, &e.to_string());
                }
                document.insert(page_num, GenerationOutcome::Error(e.to_string()));
            }
        }
    }

    document
}
