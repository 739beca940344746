//! Configuration types for slide narration.
//!
//! All run behaviour is controlled through [`NarrationConfig`], built via its
//! [`NarrationConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across runs, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::Pdf2NotesError;
use crate::pipeline::generate::GenerationClient;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default generation model when neither config nor environment names one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default generation-call ceiling per wall-clock minute.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 10;

/// Configuration for one narration run.
///
/// Built via [`NarrationConfig::builder()`] or [`NarrationConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2notes::{DetailLevel, NarrationConfig, OutputFormat};
///
/// let config = NarrationConfig::builder()
///     .model("gemini-2.5-flash")
///     .detail(DetailLevel::Expansive)
///     .pages("1,3-5")
///     .format(OutputFormat::Markdown)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct NarrationConfig {
    /// LLM model identifier, e.g. "gemini-2.5-flash", "gpt-4.1-mini".
    /// If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "ollama").
    /// If None along with `client`, the provider is auto-detected from the
    /// environment.
    pub provider_name: Option<String>,

    /// Pre-constructed generation client. Takes precedence over
    /// `provider_name`. Useful in tests or when the caller needs custom
    /// middleware around the backend.
    pub client: Option<Arc<dyn GenerationClient>>,

    /// Verbosity of the generated narration. Default: [`DetailLevel::Concise`].
    pub detail: DetailLevel,

    /// Full replacement for the built-in instruction text. When set,
    /// `detail` is ignored.
    pub instructions: Option<String>,

    /// Generation calls admitted per wall-clock minute. Default: 10.
    ///
    /// A fixed-window counter, matching free-tier backend quotas. Extraction
    /// and parsing are never rate-limited, only the backend call. When the
    /// window is saturated the pipeline sleeps until the next minute starts.
    pub requests_per_minute: u32,

    /// Raw page-selection string ("all", "5", "3-15", "1,3,5-9").
    /// If None, every page is narrated.
    pub pages: Option<String>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Sampling temperature for the completion. Default: 0.7.
    ///
    /// Narration is prose, not transcription. A mid-range temperature keeps
    /// the spoken register natural without drifting from slide content.
    pub temperature: f32,

    /// Maximum tokens the backend may generate per slide. Default: 4096.
    pub max_tokens: usize,

    /// Output rendering. Default: [`OutputFormat::Markdown`].
    pub format: OutputFormat,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-slide progress events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            client: None,
            detail: DetailLevel::default(),
            instructions: None,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            pages: None,
            password: None,
            temperature: 0.7,
            max_tokens: 4096,
            format: OutputFormat::default(),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for NarrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrationConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("client", &self.client.as_ref().map(|_| "<dyn GenerationClient>"))
            .field("detail", &self.detail)
            .field("requests_per_minute", &self.requests_per_minute)
            .field("pages", &self.pages)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("format", &self.format)
            .finish()
    }
}

impl NarrationConfig {
    /// Create a new builder for `NarrationConfig`.
    pub fn builder() -> NarrationConfigBuilder {
        NarrationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`NarrationConfig`].
#[derive(Debug)]
pub struct NarrationConfigBuilder {
    config: NarrationConfig,
}

impl NarrationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn client(mut self, client: Arc<dyn GenerationClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn detail(mut self, level: DetailLevel) -> Self {
        self.config.detail = level;
        self
    }

    pub fn instructions(mut self, text: impl Into<String>) -> Self {
        self.config.instructions = Some(text.into());
        self
    }

    pub fn requests_per_minute(mut self, n: u32) -> Self {
        self.config.requests_per_minute = n.max(1);
        self
    }

    pub fn pages(mut self, selection: impl Into<String>) -> Self {
        self.config.pages = Some(selection.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn format(mut self, fmt: OutputFormat) -> Self {
        self.config.format = fmt;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<NarrationConfig, Pdf2NotesError> {
        let c = &self.config;
        if c.requests_per_minute == 0 {
            return Err(Pdf2NotesError::InvalidConfig(
                "requests_per_minute must be >= 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(Pdf2NotesError::InvalidConfig(
                "max_tokens must be >= 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How much the narration may expand beyond what is literally on the slide.
///
/// Three levels exist because a lecture for domain outsiders wants more
/// surrounding context than a talk to specialists, and the instruction text
/// sent to the backend differs between them. The levels map to the CLI's
/// `--detail-level 0..2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DetailLevel {
    /// Stay close to the slide; add context sparingly. (default)
    #[default]
    Concise,
    /// Add supporting detail where it helps the explanation.
    Standard,
    /// Expand freely; more material is better.
    Expansive,
}

impl DetailLevel {
    /// Map the CLI's numeric `--detail-level` to a level.
    pub fn from_index(idx: u8) -> Option<Self> {
        match idx {
            0 => Some(DetailLevel::Concise),
            1 => Some(DetailLevel::Standard),
            2 => Some(DetailLevel::Expansive),
            _ => None,
        }
    }
}

/// Rendering of the assembled narration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// `## Slide N` headings with `---` separators. (default)
    #[default]
    Markdown,
    /// `--- Slide N ---` headings, no markup.
    Plain,
    /// Flat JSON object mapping page number to rendered text.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_quota_is_ten() {
        let config = NarrationConfig::default();
        assert_eq!(config.requests_per_minute, 10);
    }

    #[test]
    fn builder_clamps_quota_to_one() {
        let config = NarrationConfig::builder()
            .requests_per_minute(0)
            .build()
            .unwrap();
        assert_eq!(config.requests_per_minute, 1);
    }

    #[test]
    fn build_rejects_zero_max_tokens() {
        let err = NarrationConfig::builder().max_tokens(0).build();
        assert!(matches!(err, Err(Pdf2NotesError::InvalidConfig(_))));
    }

    #[test]
    fn detail_level_from_index() {
        assert_eq!(DetailLevel::from_index(0), Some(DetailLevel::Concise));
        assert_eq!(DetailLevel::from_index(2), Some(DetailLevel::Expansive));
        assert_eq!(DetailLevel::from_index(3), None);
    }
}
