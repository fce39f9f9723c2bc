/*!
 * Tests for translation memory functionality
 */

use std::fs;

use tarjama::translation::{InMemoryTranslationMemory, JsonTranslationMemory, TranslationMemory};

use crate::common;

#[test]
fn test_memory_store_shouldTrimKeysAndValues() {
    let memory = InMemoryTranslationMemory::new();
    memory.store("  Hello \n", " مرحبا ").unwrap();

    assert_eq!(memory.lookup("Hello"), Some("مرحبا".to_string()));
    assert_eq!(memory.lookup("   Hello"), Some("مرحبا".to_string()));
}

#[test]
fn test_memory_lookup_withMissingKey_shouldReturnNone() {
    let memory = InMemoryTranslationMemory::new();
    assert!(memory.lookup("nonexistent").is_none());
}

#[test]
fn test_memory_store_twice_shouldKeepLastWrite() {
    let memory = InMemoryTranslationMemory::new();
    memory.store("save", "حفظ").unwrap();
    memory.store("save", "احفظ").unwrap();

    assert_eq!(memory.len(), 1);
    assert_eq!(memory.lookup("save"), Some("احفظ".to_string()));
}

#[test]
fn test_memory_stats_shouldCountHitsAndMisses() {
    let memory = InMemoryTranslationMemory::new();
    memory.store("a", "b").unwrap();
    memory.lookup("a");
    memory.lookup("a");
    memory.lookup("missing");

    let (hits, misses, rate) = memory.stats();
    assert_eq!((hits, misses), (2, 1));
    assert!((rate - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_memory_search_shouldMatchSourceOrTargetIgnoringCase() {
    let memory = InMemoryTranslationMemory::new();
    memory.store("Open Settings", "فتح الإعدادات").unwrap();
    memory.store("Close", "إغلاق").unwrap();

    let by_source = memory.search("settings");
    assert_eq!(by_source.len(), 1);
    assert_eq!(by_source[0].0, "Open Settings");

    let by_target = memory.search("إغلاق");
    assert_eq!(by_target, vec![("Close".to_string(), "إغلاق".to_string())]);
}

#[test]
fn test_jsonMemory_open_withMissingFile_shouldCreateEmptyObject() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("translation_memory.json");

    let memory = JsonTranslationMemory::open(&path).unwrap();

    assert!(memory.is_empty());
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw, serde_json::json!({}));
}

#[test]
fn test_jsonMemory_store_shouldSurviveReopen() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("translation_memory.json");
    {
        let memory = JsonTranslationMemory::open(&path).unwrap();
        memory.store("New game", "لعبة جديدة").unwrap();
    }

    let reopened = JsonTranslationMemory::open(&path).unwrap();

    assert_eq!(reopened.lookup("New game"), Some("لعبة جديدة".to_string()));
    assert_eq!(reopened.path(), path.as_path());
}

#[test]
fn test_jsonMemory_clear_shouldEmptyFile() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("translation_memory.json");
    let memory = JsonTranslationMemory::open(&path).unwrap();
    memory.store("a", "b").unwrap();
    memory.store("c", "d").unwrap();

    memory.clear().unwrap();

    assert!(memory.is_empty());
    assert!(JsonTranslationMemory::open(&path).unwrap().is_empty());
}

#[test]
fn test_jsonMemory_open_withUtf8Bom_shouldLoadEntries() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "translation_memory.json",
        "\u{feff}{\"Help\": \"مساعدة\"}",
    )
    .unwrap();

    let memory = JsonTranslationMemory::open(&path).unwrap();

    assert_eq!(memory.lookup("Help"), Some("مساعدة".to_string()));
}

#[test]
fn test_jsonMemory_entries_shouldBeSortedBySource() {
    let dir = common::create_temp_dir().unwrap();
    let memory = JsonTranslationMemory::open(dir.path().join("m.json")).unwrap();
    memory.store("b", "2").unwrap();
    memory.store("a", "1").unwrap();

    let sources: Vec<_> = memory.entries().into_iter().map(|(k, _)| k).collect();

    assert_eq!(sources, vec!["a", "b"]);
}
