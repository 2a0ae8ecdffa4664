//! Optional language-model enrichment of composed responses.
//!
//! A provider may rewrite the template message into something more fluent.
//! The template path is the contract: if no provider is configured, or the
//! provider errors, times out, or returns an empty string, the template
//! response is returned unchanged.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use recall_core::error::Result;
use recall_vector::RankedResult;

use crate::compose::{ComposedResponse, ResponseComposer};
use crate::intent::QueryAnalysis;

/// External text generation collaborator.
#[async_trait]
pub trait LanguageProvider: Send + Sync {
    /// Generate a reply for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Composer that tries a language provider and falls back to templates.
pub struct EnrichedComposer {
    composer: ResponseComposer,
    provider: Option<Box<dyn LanguageProvider>>,
    timeout: Duration,
}

impl EnrichedComposer {
    /// Template-only composition, no external provider.
    pub fn template_only(composer: ResponseComposer) -> Self {
        Self {
            composer,
            provider: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn with_provider(
        composer: ResponseComposer,
        provider: Box<dyn LanguageProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            composer,
            provider: Some(provider),
            timeout,
        }
    }

    /// Compose a response, enriching the message when a provider is
    /// available. Insights and suggestions always come from the templates.
    pub async fn compose(
        &self,
        analysis: &QueryAnalysis,
        results: &[RankedResult],
    ) -> ComposedResponse {
        let base = self.composer.compose(analysis, results);

        let Some(provider) = &self.provider else {
            return base;
        };
        // The no-results message already says everything there is to say.
        if results.is_empty() {
            return base;
        }

        let prompt = build_prompt(analysis, &base, results);
        match tokio::time::timeout(self.timeout, provider.generate(&prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => ComposedResponse {
                message: text.trim().to_string(),
                ..base
            },
            Ok(Ok(_)) => {
                warn!("language provider returned an empty reply, using template");
                base
            }
            Ok(Err(e)) => {
                warn!(error = %e, "language provider failed, using template");
                base
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "language provider timed out, using template");
                base
            }
        }
    }
}

fn build_prompt(
    analysis: &QueryAnalysis,
    base: &ComposedResponse,
    results: &[RankedResult],
) -> String {
    let mut prompt = format!(
        "Rewrite this answer to the question \"{}\" in one or two friendly sentences, \
         keeping every fact intact.\n\nDraft answer:\n{}\n\nMatched items:\n",
        analysis.query, base.message
    );
    for result in results.iter().take(5) {
        let line = result.document.lines().next().unwrap_or_default();
        prompt.push_str(&format!("- {}\n", line));
    }
    prompt
}
