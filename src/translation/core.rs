/*!
 * Core translation pipeline.
 *
 * This module contains the `TranslationPipeline`, which translates a single
 * value: it segments the text, shields protected tokens, and sends each
 * translatable span through memory, glossary, provider and post-editing.
 */

use std::sync::Arc;

use log::{debug, error};

use crate::errors::TranslationError;
use crate::providers::TranslationClient;
use super::cache::TranslationMemory;
use super::glossary::{Glossary, GlossaryStore};
use super::post_edit::PostEditor;
use super::segmenter::{segment, split_whitespace_bounds, SpanKind};

/// Switches that shape how a value is translated
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// ISO code of the target language
    pub target_language: String,
    /// Apply the user glossary before calling the provider
    pub use_glossary: bool,
    /// Apply the correction table to provider output
    pub post_edit: bool,
}

impl PipelineOptions {
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            use_glossary: true,
            post_edit: true,
        }
    }
}

/// Counters for one pipeline instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Values answered entirely from memory
    pub memory_hits: usize,
    /// Spans sent to the provider
    pub provider_calls: usize,
    /// Spans kept untranslated because the provider failed
    pub provider_failures: usize,
}

impl PipelineStats {
    /// Counts accumulated since `earlier` was taken
    pub fn since(&self, earlier: &PipelineStats) -> PipelineStats {
        PipelineStats {
            memory_hits: self.memory_hits.saturating_sub(earlier.memory_hits),
            provider_calls: self.provider_calls.saturating_sub(earlier.provider_calls),
            provider_failures: self.provider_failures.saturating_sub(earlier.provider_failures),
        }
    }
}

/// Translates single values while preserving protected tokens
pub struct TranslationPipeline {
    client: Arc<dyn TranslationClient>,
    memory: Arc<dyn TranslationMemory>,
    glossary: Arc<dyn GlossaryStore>,
    post_editor: PostEditor,
    options: PipelineOptions,
    stats: parking_lot::Mutex<PipelineStats>,
}

impl std::fmt::Debug for TranslationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationPipeline")
            .field("client", &self.client)
            .field("options", &self.options)
            .finish()
    }
}

impl TranslationPipeline {
    pub fn new(
        client: Arc<dyn TranslationClient>,
        memory: Arc<dyn TranslationMemory>,
        glossary: Arc<dyn GlossaryStore>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            client,
            memory,
            glossary,
            post_editor: PostEditor::new(),
            options,
            stats: parking_lot::Mutex::new(PipelineStats::default()),
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn memory(&self) -> &Arc<dyn TranslationMemory> {
        &self.memory
    }

    pub fn stats(&self) -> PipelineStats {
        *self.stats.lock()
    }

    /// Check that the provider answers at all
    pub async fn test_connection(&self) -> Result<(), TranslationError> {
        self.client
            .translate("Hello", &self.options.target_language)
            .await?;
        Ok(())
    }

    /// Translate one value.
    ///
    /// Provider failures keep the original span text and are only logged.
    /// Only a failure to persist to the memory aborts.
    pub async fn translate_text(&self, text: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        if let Some(remembered) = self.memory.lookup(text) {
            self.stats.lock().memory_hits += 1;
            let (leading, _, trailing) = split_whitespace_bounds(text);
            return Ok(format!("{}{}{}", leading, remembered, trailing));
        }

        let glossary = if self.options.use_glossary {
            Some(self.glossary.snapshot())
        } else {
            None
        };

        let mut translated = String::with_capacity(text.len());
        let mut any_failed = false;

        for span in segment(text) {
            match span.kind {
                SpanKind::Protected => translated.push_str(&span.text),
                SpanKind::Translatable => {
                    let (leading, core, trailing) = split_whitespace_bounds(&span.text);
                    translated.push_str(leading);
                    if !core.is_empty() {
                        match self.translate_span(core, glossary.as_ref()).await? {
                            Some(result) => translated.push_str(&result),
                            None => {
                                any_failed = true;
                                translated.push_str(core);
                            }
                        }
                    }
                    translated.push_str(trailing);
                }
            }
        }

        if translated != text && !any_failed {
            self.memory.store(text, &translated)?;
        }

        Ok(translated)
    }

    /// Translate a trimmed span; `None` when the provider failed
    async fn translate_span(
        &self,
        core: &str,
        glossary: Option<&Glossary>,
    ) -> Result<Option<String>, TranslationError> {
        if let Some(remembered) = self.memory.lookup(core) {
            return Ok(Some(remembered));
        }

        let prepared = match glossary {
            Some(glossary) => glossary.apply(core),
            None => core.to_string(),
        };

        self.stats.lock().provider_calls += 1;
        match self
            .client
            .translate(&prepared, &self.options.target_language)
            .await
        {
            Ok(result) => {
                let result = result.trim();
                if result.is_empty() {
                    return Ok(Some(prepared));
                }
                let result = if self.options.post_edit {
                    self.post_editor.correct(result)
                } else {
                    result.to_string()
                };
                self.memory.store(core, &result)?;
                debug!("Translated span '{}' via {}", core, self.client.name());
                Ok(Some(result))
            }
            Err(e) => {
                self.stats.lock().provider_failures += 1;
                error!("Translation error for '{}': {}", core, e);
                Ok(None)
            }
        }
    }
}
