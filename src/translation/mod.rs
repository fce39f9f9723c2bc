/*!
 * Placeholder-preserving translation of localization files.
 *
 * This module contains the translation pipeline and everything it drives.
 * It is split into several submodules:
 *
 * - `segmenter`: splits text into protected and translatable spans
 * - `glossary`: user term substitution before translation
 * - `cache`: persistent translation memory
 * - `store`: JSON files backing the glossary and the memory
 * - `post_edit`: correction table applied after translation
 * - `bidi`: right-to-left reshaping and visual reordering
 * - `core`: the per-value pipeline
 * - `document`: line and tree document models
 * - `walker`: drives the pipeline over whole documents
 * - `progress`: progress events of a running job
 * - `job`: background jobs producing the output files
 */

// Re-export main types for easier usage
pub use self::bidi::{BidiReshaper, RtlScript};
pub use self::cache::{InMemoryTranslationMemory, JsonTranslationMemory, TranslationMemory};
pub use self::core::{PipelineOptions, PipelineStats, TranslationPipeline};
pub use self::document::{DocumentFormat, LineDocument, TreeDocument};
pub use self::glossary::{Glossary, GlossaryStore, GlossaryTerm, InMemoryGlossaryStore, JsonGlossaryStore};
pub use self::job::{JobHandle, JobReport, JobRunner, OutputOptions, TranslationJob};
pub use self::post_edit::PostEditor;
pub use self::progress::{JobEvent, ProgressReporter};
pub use self::segmenter::{segment, Span, SpanKind};

// Submodules
pub mod bidi;
pub mod cache;
pub mod core;
pub mod document;
pub mod glossary;
pub mod job;
pub mod post_edit;
pub mod progress;
pub mod segmenter;
pub mod store;
pub mod walker;
