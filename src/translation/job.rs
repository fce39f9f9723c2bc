/*!
 * Translation jobs.
 *
 * A job translates one input file into its output files. Jobs run as tokio
 * tasks so the caller stays responsive; the caller observes them through the
 * progress queue of the returned `JobHandle`. A `JobRunner` admits at most
 * one active job.
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::errors::AppError;
use crate::file_utils::{FileManager, OutputPaths, StagedFile};
use super::bidi::{BidiReshaper, RtlScript};
use super::core::{PipelineStats, TranslationPipeline};
use super::document::{DocumentFormat, LineDocument, TreeDocument};
use super::progress::{JobEvent, ProgressReporter};
use super::walker::DocumentWalker;

/// What to produce besides the translation itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// Also write the visually reordered file
    pub reorder: bool,
    /// Copy the input to `<name>_backup<ext>` before processing
    pub backup: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            reorder: true,
            backup: true,
        }
    }
}

/// A single file to translate
#[derive(Debug, Clone)]
pub struct TranslationJob {
    pub input: PathBuf,
    pub format: DocumentFormat,
    pub outputs: OutputOptions,
}

impl TranslationJob {
    /// Create a job, detecting the format from the file extension
    pub fn for_file(input: impl Into<PathBuf>, outputs: OutputOptions) -> Result<Self, AppError> {
        let input = input.into();
        let format = DocumentFormat::from_path(&input)?;
        Ok(Self { input, format, outputs })
    }
}

/// Outcome of a successful job
#[derive(Debug, Clone)]
pub struct JobReport {
    pub translated_path: PathBuf,
    pub reversed_path: Option<PathBuf>,
    pub backup_path: Option<PathBuf>,
    pub stats: PipelineStats,
}

/// Run a job to completion on the current task
pub async fn run_job(
    job: &TranslationJob,
    pipeline: &TranslationPipeline,
    progress: &mut ProgressReporter,
) -> Result<JobReport, AppError> {
    if !FileManager::file_exists(&job.input) {
        return Err(AppError::File(format!("Input file does not exist: {:?}", job.input)));
    }

    let paths = OutputPaths::for_input(&job.input);
    let stats_before = pipeline.stats();

    let backup_path = if job.outputs.backup {
        FileManager::copy_file(&job.input, &paths.backup)?;
        progress.status(format!("Backup created: {}", paths.backup.display()));
        Some(paths.backup.clone())
    } else {
        None
    };

    let reshaper = job.outputs.reorder.then(|| {
        let script = RtlScript::for_language(&pipeline.options().target_language)
            .unwrap_or(RtlScript::Arabic);
        BidiReshaper::new(script)
    });
    let walker = DocumentWalker::new(pipeline, reshaper.as_ref());

    let raw = std::fs::read(&job.input)
        .map_err(|e| AppError::File(format!("Failed to read {:?}: {}", job.input, e)))?;

    let (logical, visual) = match job.format {
        DocumentFormat::Line => {
            let document = LineDocument::parse(&raw)?;
            let output = walker.walk_lines(&document, progress).await?;
            (output.logical.to_bytes(), output.visual.map(|d| d.to_bytes()))
        }
        DocumentFormat::Tree => {
            let document = TreeDocument::parse(&raw)?;
            let output = walker.walk_tree(&document, progress).await?;
            let visual = match output.visual {
                Some(visual) => Some(visual.to_bytes()?),
                None => None,
            };
            (output.logical.to_bytes()?, visual)
        }
    };

    // Stage everything before anything lands under its final name
    let staged_translated = StagedFile::stage(&paths.translated, &logical)?;
    let staged_reversed = match &visual {
        Some(bytes) => Some(StagedFile::stage(&paths.reversed, bytes)?),
        None => None,
    };

    // Reversed file first; it is removed again if the translated file cannot land
    let reversed_path = match staged_reversed {
        Some(staged) => {
            staged.commit()?;
            progress.status(format!("Reordered file saved: {}", paths.reversed.display()));
            Some(paths.reversed.clone())
        }
        None => None,
    };

    if let Err(e) = staged_translated.commit() {
        if let Some(reversed) = &reversed_path {
            if let Err(cleanup) = std::fs::remove_file(reversed) {
                warn!("Failed to remove {:?} after an incomplete job: {}", reversed, cleanup);
            }
        }
        return Err(AppError::File(format!(
            "Failed to save {:?}: {}",
            paths.translated, e
        )));
    }
    progress.status(format!("Translated file saved: {}", paths.translated.display()));

    progress.finish();

    Ok(JobReport {
        translated_path: paths.translated,
        reversed_path,
        backup_path,
        stats: pipeline.stats().since(&stats_before),
    })
}

/// Admits one job at a time
#[derive(Debug, Clone, Default)]
pub struct JobRunner {
    active: Arc<AtomicBool>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a job is currently running
    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Spawn `job` in the background.
    ///
    /// Fails with `JobAlreadyRunning` while another job from this runner is
    /// still active.
    pub fn start(
        &self,
        job: TranslationJob,
        pipeline: Arc<TranslationPipeline>,
    ) -> Result<JobHandle, AppError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected job for {:?}: another job is running", job.input);
            return Err(AppError::JobAlreadyRunning);
        }

        let guard = ActiveGuard(Arc::clone(&self.active));
        let (mut reporter, events) = ProgressReporter::channel();

        let task = tokio::spawn(async move {
            let _guard = guard;
            info!("Starting translation of {:?}", job.input);
            run_job(&job, &pipeline, &mut reporter).await
        });

        Ok(JobHandle { events, task })
    }
}

/// Clears the runner's busy flag when the job ends, even on panic
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Observer side of a running job
#[derive(Debug)]
pub struct JobHandle {
    events: UnboundedReceiver<JobEvent>,
    task: JoinHandle<Result<JobReport, AppError>>,
}

impl JobHandle {
    /// Drain queued events without blocking
    pub fn poll_events(&mut self) -> Vec<JobEvent> {
        let mut drained = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => drained.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        drained
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the job and return its outcome
    pub async fn join(self) -> Result<JobReport, AppError> {
        self.task
            .await
            .map_err(|e| AppError::Unknown(format!("Translation task failed: {}", e)))?
    }

    /// Wait for the job, returning it together with the events not yet polled
    pub async fn join_with_events(mut self) -> (Result<JobReport, AppError>, Vec<JobEvent>) {
        let result = (&mut self.task)
            .await
            .map_err(|e| AppError::Unknown(format!("Translation task failed: {}", e)))
            .and_then(|r| r);
        let events = self.poll_events();
        (result, events)
    }
}
