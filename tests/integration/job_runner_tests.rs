/*!
 * Tests for background jobs, progress events and the single-job guard
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tarjama::app_controller::Controller;
use tarjama::errors::{AppError, FormatError, PersistenceError};
use tarjama::providers::mock::MockClient;
use tarjama::translation::{
    InMemoryTranslationMemory, JobEvent, OutputOptions, TranslationJob, TranslationMemory,
};

use crate::common;

/// Memory whose writes start failing from the nth store on
struct FailingMemory {
    inner: InMemoryTranslationMemory,
    stores: AtomicUsize,
    fail_from: usize,
}

impl FailingMemory {
    fn new(fail_from: usize) -> Self {
        Self {
            inner: InMemoryTranslationMemory::new(),
            stores: AtomicUsize::new(0),
            fail_from,
        }
    }
}

impl TranslationMemory for FailingMemory {
    fn lookup(&self, source_text: &str) -> Option<String> {
        self.inner.lookup(source_text)
    }

    fn store(&self, source_text: &str, translated_text: &str) -> Result<(), PersistenceError> {
        let attempt = self.stores.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt >= self.fail_from {
            return Err(PersistenceError::Write {
                path: PathBuf::from("translation_memory.json"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.inner.store(source_text, translated_text)
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        self.inner.clear()
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.inner.entries()
    }
}

fn temp_leftovers(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with(".tmp"))
        .collect()
}

fn progress_values(events: &[JobEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Progress(fraction) => Some(*fraction),
            JobEvent::Status(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn test_jobProgress_shouldBeMonotoneAndEndAtOne() {
    let dir = common::create_temp_dir().unwrap();
    let content = (0..20)
        .map(|i| format!(" key_{}: Value number {}\n", i, i))
        .collect::<String>();
    let input = common::create_test_file(dir.path(), "many.yml", &content).unwrap();
    let (controller, _memory) =
        common::controller_with(common::test_config(dir.path()), MockClient::working(), common::open_glossary()).unwrap();

    let handle = controller.start(controller.job_for(&input, None).unwrap()).unwrap();
    let (result, events) = handle.join_with_events().await;
    result.unwrap();

    let progress = progress_values(&events);
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(progress.iter().all(|fraction| (0.0..=1.0).contains(fraction)));
    assert_eq!(progress.last().copied(), Some(1.0));
}

#[tokio::test]
async fn test_jobEvents_shouldIncludeStatusMessages() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "ui.yml", common::SAMPLE_LINES).unwrap();
    let (controller, _memory) =
        common::controller_with(common::test_config(dir.path()), MockClient::working(), common::open_glossary()).unwrap();

    let handle = controller.start(controller.job_for(&input, None).unwrap()).unwrap();
    let (result, events) = handle.join_with_events().await;
    result.unwrap();

    let statuses: Vec<&String> = events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Status(message) => Some(message),
            JobEvent::Progress(_) => None,
        })
        .collect();
    assert!(statuses.iter().any(|m| m.starts_with("Backup created")));
    assert!(statuses.iter().any(|m| m.starts_with("Translated file saved")));
    assert!(statuses.iter().any(|m| m.starts_with("Reordered file saved")));
}

#[tokio::test]
async fn test_jobRunner_withActiveJob_shouldRejectSecondStart() {
    let dir = common::create_temp_dir().unwrap();
    let first = common::create_test_file(dir.path(), "a.yml", common::SAMPLE_LINES).unwrap();
    let second = common::create_test_file(dir.path(), "b.yml", common::SAMPLE_LINES).unwrap();
    let (controller, _memory) =
        common::controller_with(common::test_config(dir.path()), MockClient::working(), common::open_glossary()).unwrap();

    // No await between the two starts, so the first job cannot have finished
    let handle = controller.start(controller.job_for(&first, None).unwrap()).unwrap();
    assert!(controller.runner().is_busy());
    let rejected = controller.start(controller.job_for(&second, None).unwrap());
    assert!(matches!(rejected, Err(AppError::JobAlreadyRunning)));

    handle.join().await.unwrap();
    assert!(!controller.runner().is_busy());

    let handle = controller.start(controller.job_for(&second, None).unwrap()).unwrap();
    let report = handle.join().await.unwrap();
    assert!(report.translated_path.exists());
}

#[tokio::test]
async fn test_jobRunner_withMalformedXml_shouldWriteNothing() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "broken.xml", "<menu><item></menu>").unwrap();
    let mut config = common::test_config(dir.path());
    config.options.backup = false;
    let (controller, _memory) =
        common::controller_with(config, MockClient::working(), common::open_glossary()).unwrap();

    let handle = controller.start(controller.job_for(&input, None).unwrap()).unwrap();
    let result = handle.join().await;

    assert!(matches!(result, Err(AppError::Format(_))));
    assert!(!controller.runner().is_busy());
    assert!(!dir.path().join("broken_translated.xml").exists());
    assert!(!dir.path().join("broken_translated_reversed.xml").exists());

    let leftovers = temp_leftovers(dir.path());
    assert!(leftovers.is_empty(), "temporary files left behind: {:?}", leftovers);
}

#[tokio::test]
async fn test_jobRunner_withMissingInput_shouldFailWithFileError() {
    let dir = common::create_temp_dir().unwrap();
    let (controller, _memory) =
        common::controller_with(common::test_config(dir.path()), MockClient::working(), common::open_glossary()).unwrap();
    let job = TranslationJob::for_file(dir.path().join("missing.yml"), OutputOptions::default()).unwrap();

    let result = controller.start(job).unwrap().join().await;

    assert!(matches!(result, Err(AppError::File(_))));
}

#[test]
fn test_translationJob_withUnsupportedExtension_shouldFail() {
    let result = TranslationJob::for_file("notes.docx", OutputOptions::default());

    assert!(matches!(result, Err(AppError::Format(FormatError::Unsupported(_)))));
}

#[tokio::test]
async fn test_jobReport_shouldCountOnlyThisJob() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "ui.yml", " a: Save\n b: Load\n").unwrap();
    let client = MockClient::working();
    let (controller, _memory) =
        common::controller_with(common::test_config(dir.path()), client.clone(), common::open_glossary()).unwrap();

    let first = controller.run(controller.job_for(&input, None).unwrap()).await.unwrap();
    let second = controller.run(controller.job_for(&input, None).unwrap()).await.unwrap();

    assert_eq!(first.stats.provider_calls, 2);
    assert_eq!(second.stats.provider_calls, 0);
    assert!(second.stats.memory_hits >= 2);
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_jobRunner_withFailingMemoryWrite_shouldFailAndKeepEarlierEntries() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "a.yml", " a: One\n b: Two\n c: Three\n").unwrap();
    let memory = Arc::new(FailingMemory::new(3));
    let memory_dyn: Arc<dyn TranslationMemory> = memory.clone();
    let controller = Controller::with_components(
        common::test_config(dir.path()),
        Arc::new(MockClient::working()),
        memory_dyn,
        common::open_glossary(),
    )
    .unwrap()
    .without_progress();

    let result = controller.start(controller.job_for(&input, None).unwrap()).unwrap().join().await;

    assert!(matches!(result, Err(AppError::Persistence(PersistenceError::Write { .. }))));
    let entries = memory.entries();
    assert!(entries.contains(&("One".to_string(), "[ar] One".to_string())));
    assert!(!entries.iter().any(|(source, _)| source == "Three"));
    assert!(!dir.path().join("a_translated.yml").exists());
    assert!(!dir.path().join("a_translated_reversed.yml").exists());
    assert!(temp_leftovers(dir.path()).is_empty());
    assert!(!controller.runner().is_busy());
}

#[tokio::test]
async fn test_jobRunner_withBlockedTranslatedPath_shouldRemoveReversedFile() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "a.yml", common::SAMPLE_LINES).unwrap();
    // A directory in the way makes the final rename of the translated file fail
    fs::create_dir(dir.path().join("a_translated.yml")).unwrap();
    let (controller, _memory) =
        common::controller_with(common::test_config(dir.path()), MockClient::working(), common::open_glossary()).unwrap();

    let result = controller.start(controller.job_for(&input, None).unwrap()).unwrap().join().await;

    assert!(matches!(result, Err(AppError::File(_))));
    assert!(dir.path().join("a_translated.yml").is_dir());
    assert!(!dir.path().join("a_translated_reversed.yml").exists());
    assert!(temp_leftovers(dir.path()).is_empty());
}
