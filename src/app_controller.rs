use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, ProviderKind};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::libretranslate::LibreTranslate;
use crate::providers::ollama::Ollama;
use crate::providers::{RetryPolicy, TranslationClient};
use crate::translation::{
    DocumentFormat, GlossaryStore, GlossaryTerm, JobEvent, JobHandle, JobReport, JobRunner, JsonGlossaryStore,
    JsonTranslationMemory, PipelineOptions, TranslationJob, TranslationMemory, TranslationPipeline,
};

// @module: Application controller for localization file translation

/// Extensions picked up when translating a whole folder
const SUPPORTED_EXTENSIONS: &[&str] = &["yml", "yaml", "txt", "xml"];

/// Resolution of the progress bar
const PROGRESS_UNITS: u64 = 1000;

/// Outcome of a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared translation pipeline
    pipeline: Arc<TranslationPipeline>,
    // @field: Glossary store, also used by the management commands
    glossary: Arc<dyn GlossaryStore>,
    // @field: Translation memory, also used by the management commands
    memory: Arc<dyn TranslationMemory>,
    // @field: Single-job gate
    runner: JobRunner,
    // @field: Draw progress bars
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller backed by the configured files and provider
    pub fn with_config(config: Config) -> Result<Self> {
        Self::check_config(&config)?;

        let glossary: Arc<dyn GlossaryStore> = Arc::new(
            JsonGlossaryStore::open(&config.storage.glossary_path)
                .context("Failed to open glossary")?,
        );
        let memory: Arc<dyn TranslationMemory> = Arc::new(
            JsonTranslationMemory::open(&config.storage.memory_path)
                .context("Failed to open translation memory")?,
        );
        let client = build_client(&config)?;

        Self::with_components(config, client, memory, glossary)
    }

    // @method: Create a controller from explicit collaborators
    pub fn with_components(
        config: Config,
        client: Arc<dyn TranslationClient>,
        memory: Arc<dyn TranslationMemory>,
        glossary: Arc<dyn GlossaryStore>,
    ) -> Result<Self> {
        Self::check_config(&config)?;

        let target_language = language_utils::normalize_to_part1_or_part2t(&config.target_language)
            .context("Invalid target language")?;

        let options = PipelineOptions {
            target_language,
            use_glossary: config.options.use_glossary,
            post_edit: config.options.post_edit,
        };

        let pipeline = Arc::new(TranslationPipeline::new(
            client,
            Arc::clone(&memory),
            Arc::clone(&glossary),
            options,
        ));

        Ok(Self {
            config,
            pipeline,
            glossary,
            memory,
            runner: JobRunner::new(),
            show_progress: true,
        })
    }

    // @validates: Configuration handed in by library callers, not only the CLI
    fn check_config(config: &Config) -> Result<(), AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))
    }

    /// Disable progress bars, for tests and non-interactive use
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pipeline(&self) -> &Arc<TranslationPipeline> {
        &self.pipeline
    }

    pub fn runner(&self) -> &JobRunner {
        &self.runner
    }

    /// Check that the provider answers
    pub async fn test_connection(&self) -> Result<()> {
        self.pipeline
            .test_connection()
            .await
            .context("Provider connection test failed")
    }

    /// Start `job` in the background without waiting for it
    pub fn start(&self, job: TranslationJob) -> Result<JobHandle, AppError> {
        self.runner.start(job, Arc::clone(&self.pipeline))
    }

    /// Build the job for a file, using an explicit format when given
    pub fn job_for(&self, input_file: &Path, format: Option<DocumentFormat>) -> Result<TranslationJob, AppError> {
        let outputs = self.config.options.outputs();
        match format {
            Some(format) => Ok(TranslationJob {
                input: input_file.to_path_buf(),
                format,
                outputs,
            }),
            None => TranslationJob::for_file(input_file, outputs),
        }
    }

    /// Translate one file and wait for it, showing progress
    pub async fn run(&self, job: TranslationJob) -> Result<JobReport> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(job, &multi_progress).await
    }

    async fn run_with_progress(&self, job: TranslationJob, multi_progress: &MultiProgress) -> Result<JobReport> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(&job.input) {
            return Err(anyhow!("Input file does not exist: {:?}", job.input));
        }

        let file_name = job
            .input
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "input".to_string());

        info!(
            "Translating {} to {} ('{}') with {}",
            file_name,
            language_utils::get_language_name(&self.pipeline.options().target_language)
                .unwrap_or_else(|_| "unknown language".to_string()),
            self.pipeline.options().target_language,
            self.config.provider.kind.display_name()
        );

        let progress_bar = if self.show_progress {
            multi_progress.add(ProgressBar::new(PROGRESS_UNITS))
        } else {
            ProgressBar::hidden()
        };
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {percent}% {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message(file_name.clone());

        let mut handle = self.start(job)?;

        let mut interval = tokio::time::interval(Duration::from_millis(self.config.progress_poll_ms));
        while !handle.is_finished() {
            interval.tick().await;
            Self::apply_events(&progress_bar, handle.poll_events());
        }

        let (result, remaining) = handle.join_with_events().await;
        Self::apply_events(&progress_bar, remaining);

        match result {
            Ok(report) => {
                progress_bar.finish_with_message(format!("{} done", file_name));
                info!(
                    "Success: {} ({} provider calls, {} memory hits, {} failed spans) in {}",
                    report.translated_path.display(),
                    report.stats.provider_calls,
                    report.stats.memory_hits,
                    report.stats.provider_failures,
                    Self::format_duration(start_time.elapsed())
                );
                if report.stats.provider_failures > 0 {
                    warn!(
                        "{} spans could not be translated and were kept in the source language",
                        report.stats.provider_failures
                    );
                }
                Ok(report)
            }
            Err(e) => {
                progress_bar.abandon_with_message(format!("{} failed", file_name));
                Err(anyhow::Error::new(e).context(format!("Translation of {} failed", file_name)))
            }
        }
    }

    fn apply_events(progress_bar: &ProgressBar, events: Vec<JobEvent>) {
        for event in events {
            match event {
                JobEvent::Progress(fraction) => {
                    progress_bar.set_position((fraction * PROGRESS_UNITS as f64).round() as u64);
                }
                JobEvent::Status(message) => {
                    debug!("{}", message);
                }
            }
        }
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Translate every supported file under `input_dir`, one at a time.
    /// Our own outputs and backups are skipped.
    pub async fn run_folder(&self, input_dir: PathBuf) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let files: Vec<PathBuf> = FileManager::find_files(&input_dir, SUPPORTED_EXTENSIONS)?
            .into_iter()
            .filter(|path| !FileManager::is_generated_output(path))
            .collect();

        if files.is_empty() {
            return Err(anyhow!("No localization files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = if self.show_progress {
            multi_progress.add(ProgressBar::new(files.len() as u64))
        } else {
            ProgressBar::hidden()
        };
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for file in &files {
            let outcome = match self.job_for(file, None) {
                Ok(job) => self.run_with_progress(job, &multi_progress).await,
                Err(e) => Err(anyhow::Error::new(e)),
            };
            match outcome {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    error!("{:#}", e);
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Done");
        info!(
            "Processed {} files ({} failed) in {}",
            files.len(),
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    /// Glossary terms in application order
    pub fn glossary_terms(&self) -> Vec<GlossaryTerm> {
        self.glossary.snapshot().terms().to_vec()
    }

    pub fn add_glossary_term(&self, source: &str, target: &str) -> Result<()> {
        if source.trim().is_empty() {
            return Err(anyhow!("Glossary source term must not be empty"));
        }
        self.glossary
            .add_term(source, target)
            .context("Failed to save glossary")?;
        info!("Glossary term added: {} -> {}", source.trim(), target.trim());
        Ok(())
    }

    /// Remove a glossary term; returns whether it existed
    pub fn remove_glossary_term(&self, source: &str) -> Result<bool> {
        let removed = self
            .glossary
            .remove_term(source)
            .context("Failed to save glossary")?;
        if removed {
            info!("Glossary term removed: {}", source.trim());
        } else {
            warn!("No glossary term for '{}'", source.trim());
        }
        Ok(removed)
    }

    pub fn memory_entries(&self) -> Vec<(String, String)> {
        self.memory.entries()
    }

    pub fn search_memory(&self, needle: &str) -> Vec<(String, String)> {
        self.memory.search(needle)
    }

    /// Drop all remembered translations; returns how many were removed
    pub fn clear_memory(&self) -> Result<usize> {
        let count = self.memory.len();
        self.memory.clear().context("Failed to clear translation memory")?;
        info!("Translation memory cleared ({} entries)", count);
        Ok(count)
    }
}

/// Build the HTTP client for the configured provider
pub fn build_client(config: &Config) -> Result<Arc<dyn TranslationClient>> {
    let provider = &config.provider;
    let retry = RetryPolicy {
        max_retries: provider.retry_count,
        backoff_base_ms: provider.retry_backoff_ms,
    };
    let endpoint = provider.effective_endpoint();

    let client: Arc<dyn TranslationClient> = match provider.kind {
        ProviderKind::Ollama => Arc::new(
            Ollama::new(
                &endpoint,
                provider.model.clone(),
                provider.temperature,
                provider.timeout_secs,
                retry,
            )
            .context("Failed to create Ollama client")?,
        ),
        ProviderKind::LibreTranslate => Arc::new(
            LibreTranslate::new(&endpoint, provider.api_key(), provider.timeout_secs, retry)
                .context("Failed to create LibreTranslate client")?,
        ),
    };

    debug!("Using {} at {}", provider.kind.display_name(), endpoint);
    Ok(client)
}
