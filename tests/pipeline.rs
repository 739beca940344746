//! Integration tests for the narration pipeline.
//!
//! The per-slide loop is driven with synthetic slide content, a scripted
//! backend client, and a fixed clock, so these tests make no network calls
//! and never sleep through a real rate window.

use async_trait::async_trait;
use pdf2notes::narrate::process_pages;
use pdf2notes::pipeline::limiter::Clock;
use pdf2notes::{
    GenerationClient, GenerationError, GenerationOutcome, NarrationConfig, OutputFormat,
    PageContent, RateLimiter, NO_TEXT_SENTINEL,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Clock pinned to a fixed instant; admissions never cross a minute boundary.
struct FixedClock(u64);

impl Clock for FixedClock {
    fn now_secs(&self) -> u64 {
        self.0
    }
}

/// Backend double: echoes a canned response, failing for listed pages.
struct ScriptedClient {
    fail_pages: HashSet<usize>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn ok() -> Self {
        Self::failing_on(&[])
    }

    fn failing_on(pages: &[usize]) -> Self {
        Self {
            fail_pages: pages.iter().copied().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(
        &self,
        _instructions: &str,
        content: &PageContent,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pages.contains(&content.page_num) {
            Err(GenerationError("backend unavailable".into()))
        } else {
            Ok(format!("Narration for slide {}.", content.page_num))
        }
    }
}

fn slide(page_num: usize, text: &str) -> PageContent {
    PageContent {
        page_num,
        text: text.to_string(),
        images: Vec::new(),
    }
}

fn deck(texts: &[(usize, &str)]) -> Vec<PageContent> {
    texts.iter().map(|(n, t)| slide(*n, t)).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn every_selected_slide_gets_exactly_one_outcome() {
    let contents = deck(&[(1, "intro"), (2, "agenda"), (3, "details")]);
    let client = ScriptedClient::ok();
    let mut limiter = RateLimiter::new(10);
    let config = NarrationConfig::default();

    let doc = process_pages(
        &contents,
        "instructions",
        &client,
        &mut limiter,
        &FixedClock(0),
        &config,
    )
    .await;

    assert_eq!(doc.len(), 3);
    for page in 1..=3 {
        assert!(matches!(
            doc.get(page),
            Some(GenerationOutcome::Text(_))
        ));
    }
    assert_eq!(client.call_count(), 3);
}

#[tokio::test]
async fn empty_slide_yields_sentinel_and_consumes_no_admission() {
    let contents = deck(&[(1, "content"), (2, "   \n\t"), (3, "more content")]);
    let client = ScriptedClient::ok();
    let mut limiter = RateLimiter::new(10);
    let config = NarrationConfig::default();

    let doc = process_pages(
        &contents,
        "instructions",
        &client,
        &mut limiter,
        &FixedClock(90),
        &config,
    )
    .await;

    assert_eq!(doc.get(2), Some(&GenerationOutcome::Empty));
    assert_eq!(doc.get(2).unwrap().render(), NO_TEXT_SENTINEL);
    // Slide 2 never reached the backend or the limiter.
    assert_eq!(client.call_count(), 2);
    assert_eq!(limiter.admitted_this_minute(), 2);
}

#[tokio::test]
async fn one_failing_slide_never_aborts_the_rest() {
    let contents = deck(&[(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
    let client = ScriptedClient::failing_on(&[2]);
    let mut limiter = RateLimiter::new(10);
    let config = NarrationConfig::default();

    let doc = process_pages(
        &contents,
        "instructions",
        &client,
        &mut limiter,
        &FixedClock(0),
        &config,
    )
    .await;

    // The run produced an outcome for every slide, no more, no fewer.
    assert_eq!(doc.len(), 4);
    assert!(matches!(doc.get(1), Some(GenerationOutcome::Text(_))));
    assert!(matches!(doc.get(2), Some(GenerationOutcome::Error(_))));
    assert!(matches!(doc.get(3), Some(GenerationOutcome::Text(_))));
    assert!(matches!(doc.get(4), Some(GenerationOutcome::Text(_))));

    // The failed slide renders error-tagged, and does not leak into others.
    assert_eq!(
        doc.get(2).unwrap().render(),
        "[ERROR] backend unavailable"
    );
}

#[tokio::test]
async fn all_slides_failing_still_completes_the_run() {
    let contents = deck(&[(1, "a"), (2, "b")]);
    let client = ScriptedClient::failing_on(&[1, 2]);
    let mut limiter = RateLimiter::new(10);
    let config = NarrationConfig::default();

    let doc = process_pages(
        &contents,
        "instructions",
        &client,
        &mut limiter,
        &FixedClock(0),
        &config,
    )
    .await;

    assert_eq!(doc.len(), 2);
    assert!(doc
        .iter()
        .all(|(_, o)| matches!(o, GenerationOutcome::Error(_))));
}

#[tokio::test]
async fn selection_gaps_are_preserved_in_the_document() {
    // Selection was "1,3-4": page 2 is absent from the run entirely.
    let contents = deck(&[(1, "a"), (3, "c"), (4, "d")]);
    let client = ScriptedClient::ok();
    let mut limiter = RateLimiter::new(10);
    let config = NarrationConfig::default();

    let doc = process_pages(
        &contents,
        "instructions",
        &client,
        &mut limiter,
        &FixedClock(0),
        &config,
    )
    .await;

    assert_eq!(doc.len(), 3);
    assert!(doc.get(2).is_none());

    let pages: Vec<usize> = doc.iter().map(|(p, _)| p).collect();
    assert_eq!(pages, vec![1, 3, 4]);
}

#[tokio::test]
async fn three_slide_deck_with_empty_middle_round_trip() {
    // Document with 3 pages, page 2 empty, full selection: the output has
    // three sections and section 2 is exactly the sentinel.
    let contents = deck(&[(1, "Welcome"), (2, ""), (3, "Questions?")]);
    let client = ScriptedClient::ok();
    let mut limiter = RateLimiter::new(10);
    let config = NarrationConfig::default();

    let doc = process_pages(
        &contents,
        "instructions",
        &client,
        &mut limiter,
        &FixedClock(0),
        &config,
    )
    .await;

    let md = doc.render(OutputFormat::Markdown).unwrap();
    assert_eq!(md.matches("## Slide ").count(), 3);
    assert!(md.contains(&format!("## Slide 2\n\n{NO_TEXT_SENTINEL}\n")));

    let plain = doc.render(OutputFormat::Plain).unwrap();
    let p1 = plain.find("--- Slide 1 ---").unwrap();
    let p2 = plain.find("--- Slide 2 ---").unwrap();
    let p3 = plain.find("--- Slide 3 ---").unwrap();
    assert!(p1 < p2 && p2 < p3);
}

#[tokio::test]
async fn admissions_match_non_empty_slides_within_quota() {
    let contents = deck(&[(1, "a"), (2, ""), (3, "c"), (4, ""), (5, "e")]);
    let client = ScriptedClient::ok();
    let mut limiter = RateLimiter::new(10);
    let config = NarrationConfig::default();

    process_pages(
        &contents,
        "instructions",
        &client,
        &mut limiter,
        &FixedClock(42),
        &config,
    )
    .await;

    assert_eq!(limiter.admitted_this_minute(), 3);
    assert_eq!(client.call_count(), 3);
}
