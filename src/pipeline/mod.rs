//! Pipeline stages for slide narration.
//!
//! Each submodule implements exactly one step. Keeping stages separate makes
//! each independently testable and lets us swap implementations (e.g. switch
//! the extraction backend) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ select ──▶ extract ──▶ limiter ──▶ generate
//! (URL/path) (pages)  (pdfium)    (rpm gate)   (LLM)
//! ```
//!
//! 1. [`input`]   — canonicalise the user-supplied path or URL to a local file
//! 2. [`select`]  — parse the page-selection string against the page count
//! 3. [`extract`] — pull per-page text and embedded images; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 4. [`limiter`] — minute-bucket admission control in front of the backend
//! 5. [`encode`]  — PNG-encode and base64-wrap embedded images for the
//!    multimodal request body
//! 6. [`generate`] — the backend-call seam; the only stage with network I/O

pub mod encode;
pub mod extract;
pub mod generate;
pub mod input;
pub mod limiter;
pub mod select;
