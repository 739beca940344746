//! Instruction text sent to the generation backend.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the pipeline treats the instruction text
//!    as an opaque string; changing tone or rules requires editing exactly
//!    one place.
//!
//! 2. **Testability** — unit tests can inspect the assembled instructions
//!    without spinning up a real backend.
//!
//! Callers can replace the whole text via
//! [`crate::config::NarrationConfig::instructions`]; the constants here are
//! used only when no override is provided.

use crate::config::DetailLevel;

/// Literal marker emitted for slides with no extractable content.
///
/// The same string appears in two places on purpose: the instruction text
/// tells the backend to answer with it when a slide is blank, and the output
/// writer emits it directly for slides the pipeline already knows are empty
/// (those never reach the backend at all).
pub const NO_TEXT_SENTINEL: &str = "[NO TEXT DETECTED]";

/// Base instructions for converting one slide into spoken presenter notes.
///
/// Used when `NarrationConfig::instructions` is `None`; a detail-level
/// suffix from [`detail_suffix`] is appended.
pub const BASE_INSTRUCTIONS: &str = r#"You are preparing presenter notes for a lecture course built on an existing slide deck.

For the single slide provided, write the oral speech the presenter would give, following these rules:

1. CONTENT
   - The notes must track the content of the slide, phrased as a spoken
     explanation suitable for a technical-but-accessible lecture.
   - Write speech to be read aloud, not prose to be read silently.

2. FORMAT
   - Write the notes in Markdown, using a title, subheadings, and lists where
     they improve readability for the presenter.
   - Do not reference the fact that you are generating presenter notes.

3. WHAT TO LEAVE OUT
   - No greetings, sign-offs, or filler ("good morning", "let's begin",
     "thank you" and similar).
   - No closing summary of the slide.
   - No commentary outside the speech itself: the output is pasted directly
     into the presenter-notes field, so any extra sentence is noise.

4. EMPTY SLIDES
   - If the slide is blank or has no content, answer with exactly
     "[NO TEXT DETECTED]" and nothing else."#;

/// Per-level suffixes controlling how far the narration may expand beyond
/// the slide. Indexed by [`DetailLevel`].
const DETAIL_SUFFIXES: [&str; 3] = [
    "\n\n5. DETAIL\n   - Only add background detail when clearly useful, and with restraint;\n     later slides may cover it already. Do not overdo it.",
    "\n\n5. DETAIL\n   - Add supporting detail on the slide's topic where it helps the\n     explanation; extra context is welcome.",
    "\n\n5. DETAIL\n   - Expand the speech freely with relevant detail; the more material the\n     presenter has to work with, the better.",
];

/// Suffix for the given detail level.
pub fn detail_suffix(level: DetailLevel) -> &'static str {
    match level {
        DetailLevel::Concise => DETAIL_SUFFIXES[0],
        DetailLevel::Standard => DETAIL_SUFFIXES[1],
        DetailLevel::Expansive => DETAIL_SUFFIXES[2],
    }
}

/// Assemble the instruction text for a run.
///
/// An explicit override wins outright; otherwise base + detail suffix.
pub fn instructions_for(level: DetailLevel, override_text: Option<&str>) -> String {
    match override_text {
        Some(text) => text.to_string(),
        None => format!("{}{}", BASE_INSTRUCTIONS, detail_suffix(level)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_instructions_name_the_sentinel() {
        assert!(BASE_INSTRUCTIONS.contains(NO_TEXT_SENTINEL));
    }

    #[test]
    fn suffix_varies_by_level() {
        let concise = instructions_for(DetailLevel::Concise, None);
        let expansive = instructions_for(DetailLevel::Expansive, None);
        assert_ne!(concise, expansive);
        assert!(concise.starts_with(BASE_INSTRUCTIONS));
    }

    #[test]
    fn override_replaces_everything() {
        let text = instructions_for(DetailLevel::Expansive, Some("custom"));
        assert_eq!(text, "custom");
    }
}
