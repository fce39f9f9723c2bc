/*!
 * End-to-end tests for line-oriented localization files
 */

use std::fs;

use tarjama::providers::mock::MockClient;
use tarjama::translation::TranslationMemory;

use crate::common;

#[tokio::test]
async fn test_lineJob_withPlaceholderAndGlossary_shouldWriteBothOutputs() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "menu_l_english.yml", common::SAMPLE_LINES).unwrap();
    let client = MockClient::working();
    let (controller, _memory) =
        common::controller_with(common::test_config(dir.path()), client.clone(), common::open_glossary()).unwrap();

    let job = controller.job_for(&input, None).unwrap();
    let report = controller.run(job).await.unwrap();

    let translated = common::read_output(&report.translated_path);
    assert_eq!(
        translated,
        "l_english:\n# comment\n name: [ar] فتح the $FILE$ [ar] now\n"
    );
    assert_eq!(client.requests(), vec!["فتح the", "now"]);

    let reversed_path = report.reversed_path.expect("reordering is enabled by default");
    let reversed = common::read_output(&reversed_path);
    let lines: Vec<_> = reversed.lines().collect();
    assert_eq!(lines[0], "l_english:");
    assert_eq!(lines[1], "# comment");
    assert!(lines[2].starts_with(" name:"));
    assert!(lines[2].contains("$FILE$"));
}

#[tokio::test]
async fn test_lineJob_shouldWriteUtf8BomAndKeepInputUntouched() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "a.yml", common::SAMPLE_LINES).unwrap();
    let (controller, _memory) =
        common::controller_with(common::test_config(dir.path()), MockClient::working(), common::open_glossary()).unwrap();

    let report = controller.run(controller.job_for(&input, None).unwrap()).await.unwrap();

    let bytes = fs::read(&report.translated_path).unwrap();
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    assert_eq!(fs::read_to_string(&input).unwrap(), common::SAMPLE_LINES);
    assert_eq!(report.translated_path, dir.path().join("a_translated.yml"));
    assert_eq!(report.reversed_path, Some(dir.path().join("a_translated_reversed.yml")));
}

#[tokio::test]
async fn test_lineJob_withBackupEnabled_shouldCopyInputFirst() {
    let dir = common::create_temp_dir().unwrap();
    let content = "\u{feff}l_english:\r\n key: Save\r\n";
    let input = common::create_test_file(dir.path(), "b.yml", content).unwrap();
    let (controller, _memory) =
        common::controller_with(common::test_config(dir.path()), MockClient::working(), common::open_glossary()).unwrap();

    let report = controller.run(controller.job_for(&input, None).unwrap()).await.unwrap();

    let backup = report.backup_path.expect("backup is enabled by default");
    assert_eq!(fs::read_to_string(backup).unwrap(), content);
    // CRLF terminators survive translation
    assert_eq!(common::read_output(&report.translated_path), "l_english:\r\n key: [ar] Save\r\n");
}

#[tokio::test]
async fn test_lineJob_withReorderAndBackupDisabled_shouldWriteOnlyTranslation() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "c.yml", common::SAMPLE_LINES).unwrap();
    let mut config = common::test_config(dir.path());
    config.options.reorder = false;
    config.options.backup = false;
    let (controller, _memory) =
        common::controller_with(config, MockClient::working(), common::open_glossary()).unwrap();

    let report = controller.run(controller.job_for(&input, None).unwrap()).await.unwrap();

    assert!(report.reversed_path.is_none());
    assert!(report.backup_path.is_none());
    assert!(!dir.path().join("c_translated_reversed.yml").exists());
    assert!(!dir.path().join("c_backup.yml").exists());
}

#[tokio::test]
async fn test_lineJob_runTwice_shouldNotCallProviderAgain() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "d.yml", common::SAMPLE_LINES).unwrap();
    let client = MockClient::working();
    let (controller, memory) =
        common::controller_with(common::test_config(dir.path()), client.clone(), common::open_glossary()).unwrap();

    let first = controller.run(controller.job_for(&input, None).unwrap()).await.unwrap();
    let first_output = common::read_output(&first.translated_path);
    let calls_after_first = client.call_count();
    let second = controller.run(controller.job_for(&input, None).unwrap()).await.unwrap();

    assert_eq!(client.call_count(), calls_after_first);
    assert_eq!(common::read_output(&second.translated_path), first_output);
    assert_eq!(second.stats.provider_calls, 0);
    assert!(second.stats.memory_hits > 0);
    assert_eq!(memory.lookup("Open the $FILE$ now"), Some("[ar] فتح the $FILE$ [ar] now".to_string()));
}

#[tokio::test]
async fn test_lineJob_withFailingProvider_shouldCompleteWithSourceText() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "e.yml", common::SAMPLE_LINES).unwrap();
    let (controller, memory) =
        common::controller_with(common::test_config(dir.path()), MockClient::failing(), common::open_glossary()).unwrap();

    let report = controller.run(controller.job_for(&input, None).unwrap()).await.unwrap();

    assert_eq!(common::read_output(&report.translated_path), common::SAMPLE_LINES);
    assert_eq!(report.stats.provider_failures, 2);
    assert!(memory.is_empty());
}
