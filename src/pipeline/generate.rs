//! The backend-call seam: turn one slide's content into narration text.
//!
//! [`GenerationClient`] is the trait boundary the pipeline calls through, so
//! tests can substitute a scripted client and never touch the network. The
//! production implementation, [`LlmClient`], wraps an
//! `edgequake_llm::LLMProvider` and is intentionally thin — all instruction
//! text lives in [`crate::prompts`] so it can change without touching
//! request assembly here.
//!
//! There is no retry anywhere: a failed call is recorded once as that
//! slide's outcome and the pipeline moves on. Auth, quota, network, and
//! malformed-response faults are all the same opaque [`GenerationError`].

use crate::config::{NarrationConfig, DEFAULT_MODEL};
use crate::error::{GenerationError, Pdf2NotesError};
use crate::pipeline::encode;
use crate::pipeline::extract::PageContent;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// One generation call: instructions + slide content in, narration text out.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        instructions: &str,
        content: &PageContent,
    ) -> Result<String, GenerationError>;
}

/// Production client backed by an `edgequake_llm` provider.
pub struct LlmClient {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32, max_tokens: usize) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }
}

#[async_trait]
impl GenerationClient for LlmClient {
    /// ## Message Layout
    ///
    /// 1. **System message** — the assembled instruction text
    /// 2. **User message** — the slide's extracted text, with its embedded
    ///    images attached as base64 PNGs
    ///
    /// Undecodable images were already dropped during extraction; an image
    /// that fails PNG re-encoding here is likewise skipped with a warning
    /// rather than failing the slide.
    async fn generate(
        &self,
        instructions: &str,
        content: &PageContent,
    ) -> Result<String, GenerationError> {
        let start = Instant::now();

        let images: Vec<ImageData> = content
            .images
            .iter()
            .filter_map(|img| match encode::encode_image(img) {
                Ok(data) => Some(data),
                Err(e) => {
                    warn!(
                        "Page {}: dropping image that failed PNG encoding: {e}",
                        content.page_num
                    );
                    None
                }
            })
            .collect();

        let messages = vec![
            ChatMessage::system(instructions),
            ChatMessage::user_with_images(content.text.as_str(), images),
        ];

        let options = CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| GenerationError(e.to_string()))?;

        debug!(
            "Page {}: {} input tokens, {} output tokens, {:?}",
            content.page_num,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        Ok(response.content)
    }
}

/// Resolve the generation client, from most-specific to least-specific.
///
/// 1. **Pre-built client** (`config.client`) — used as-is; this is how tests
///    inject scripted backends.
/// 2. **Named provider + model** (`config.provider_name`) — reads the
///    corresponding API key from the environment.
/// 3. **`GEMINI_API_KEY` present** — gemini with the default model, matching
///    the deck-narration workflow this tool grew out of.
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — scans all known
///    API key variables and picks the first available provider.
pub fn resolve_client(
    config: &NarrationConfig,
) -> Result<Arc<dyn GenerationClient>, Pdf2NotesError> {
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
        let provider = create_provider(name, model)?;
        return Ok(wrap(provider, config));
    }

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            let provider = create_provider("gemini", model)?;
            return Ok(wrap(provider, config));
        }
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Pdf2NotesError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or pass --provider.\n\
                Error: {e}"
            ),
        })?;

    Ok(wrap(provider, config))
}

fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, Pdf2NotesError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Pdf2NotesError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn wrap(provider: Arc<dyn LLMProvider>, config: &NarrationConfig) -> Arc<dyn GenerationClient> {
    Arc::new(LlmClient::new(
        provider,
        config.temperature,
        config.max_tokens,
    ))
}
