/*!
 * Tests for the per-value translation pipeline
 */

use std::sync::Arc;

use tarjama::providers::mock::MockClient;
use tarjama::translation::{
    Glossary, InMemoryGlossaryStore, InMemoryTranslationMemory, PipelineOptions, TranslationMemory,
    TranslationPipeline,
};

fn pipeline_with(
    client: &MockClient,
    memory: Arc<InMemoryTranslationMemory>,
    glossary: Glossary,
    options: PipelineOptions,
) -> TranslationPipeline {
    TranslationPipeline::new(
        Arc::new(client.clone()),
        memory,
        Arc::new(InMemoryGlossaryStore::new(glossary)),
        options,
    )
}

fn plain_options() -> PipelineOptions {
    let mut options = PipelineOptions::new("ar");
    options.use_glossary = false;
    options
}

#[tokio::test]
async fn test_translateText_withBlankValue_shouldReturnUnchangedWithoutCalls() {
    let client = MockClient::working();
    let pipeline = pipeline_with(&client, Arc::default(), Glossary::new(), plain_options());

    assert_eq!(pipeline.translate_text("   ").await.unwrap(), "   ");
    assert_eq!(pipeline.translate_text("").await.unwrap(), "");
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_translateText_withPlaceholder_shouldTranslateAroundIt() {
    let client = MockClient::working();
    let pipeline = pipeline_with(&client, Arc::default(), Glossary::new(), plain_options());

    let result = pipeline.translate_text(" Open the $FILE$ now").await.unwrap();

    assert_eq!(result, " [ar] Open the $FILE$ [ar] now");
    assert_eq!(client.requests(), vec!["Open the", "now"]);
}

#[tokio::test]
async fn test_translateText_withOnlyProtectedTokens_shouldNotCallProvider() {
    let client = MockClient::working();
    let memory = Arc::new(InMemoryTranslationMemory::new());
    let pipeline = pipeline_with(&client, memory.clone(), Glossary::new(), plain_options());

    let result = pipeline.translate_text("$VALUE$ [Root.GetName]").await.unwrap();

    assert_eq!(result, "$VALUE$ [Root.GetName]");
    assert_eq!(client.call_count(), 0);
    assert!(memory.is_empty());
}

#[tokio::test]
async fn test_translateText_withGlossary_shouldSubstituteBeforeProvider() {
    let client = MockClient::working();
    let options = PipelineOptions::new("ar");
    let pipeline = pipeline_with(&client, Arc::default(), Glossary::from_pairs([("open", "فتح")]), options);

    let result = pipeline.translate_text("Open the $FILE$").await.unwrap();

    assert_eq!(client.requests()[0], "فتح the");
    assert_eq!(result, "[ar] فتح the $FILE$");
}

#[tokio::test]
async fn test_translateText_withGlossaryDisabled_shouldSendOriginalText() {
    let client = MockClient::working();
    let pipeline = pipeline_with(&client, Arc::default(), Glossary::from_pairs([("open", "فتح")]), plain_options());

    pipeline.translate_text("Open").await.unwrap();

    assert_eq!(client.requests(), vec!["Open"]);
}

#[tokio::test]
async fn test_translateText_withPostEdit_shouldCorrectProviderOutput() {
    let client = MockClient::working().with_custom_response(|_, _| "ذهب الى البيت".to_string());
    let memory = Arc::new(InMemoryTranslationMemory::new());
    let pipeline = pipeline_with(&client, memory.clone(), Glossary::new(), PipelineOptions::new("ar"));

    let result = pipeline.translate_text("He went home").await.unwrap();

    assert_eq!(result, "ذهب إلى البيت");
    assert_eq!(memory.lookup("He went home"), Some("ذهب إلى البيت".to_string()));
}

#[tokio::test]
async fn test_translateText_withPostEditDisabled_shouldKeepProviderOutput() {
    let client = MockClient::working().with_custom_response(|_, _| "ذهب الى البيت".to_string());
    let mut options = plain_options();
    options.post_edit = false;
    let pipeline = pipeline_with(&client, Arc::default(), Glossary::new(), options);

    assert_eq!(pipeline.translate_text("He went home").await.unwrap(), "ذهب الى البيت");
}

#[tokio::test]
async fn test_translateText_withRememberedValue_shouldShortCircuitAndKeepWhitespace() {
    let client = MockClient::working();
    let memory = Arc::new(InMemoryTranslationMemory::new());
    memory.store("Hello", "مرحبا").unwrap();
    let pipeline = pipeline_with(&client, memory, Glossary::new(), plain_options());

    let result = pipeline.translate_text("  Hello ").await.unwrap();

    assert_eq!(result, "  مرحبا ");
    assert_eq!(client.call_count(), 0);
    assert_eq!(pipeline.stats().memory_hits, 1);
}

#[tokio::test]
async fn test_translateText_calledTwice_shouldUseMemoryTheSecondTime() {
    let client = MockClient::working();
    let pipeline = pipeline_with(&client, Arc::default(), Glossary::new(), plain_options());

    let first = pipeline.translate_text("Start $N$ turns").await.unwrap();
    let calls = client.call_count();
    let second = pipeline.translate_text("Start $N$ turns").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(client.call_count(), calls);
}

#[tokio::test]
async fn test_translateText_withProviderFailure_shouldKeepOriginalAndNotCache() {
    let client = MockClient::failing();
    let memory = Arc::new(InMemoryTranslationMemory::new());
    let pipeline = pipeline_with(&client, memory.clone(), Glossary::new(), plain_options());

    let result = pipeline.translate_text("Open the $FILE$ now").await.unwrap();

    assert_eq!(result, "Open the $FILE$ now");
    assert!(memory.is_empty());
    assert_eq!(pipeline.stats().provider_failures, 2);
}

#[tokio::test]
async fn test_translateText_withPartialFailure_shouldCacheOnlySucceededSpans() {
    // Every second request fails: "one" succeeds, "two" fails
    let client = MockClient::intermittent(2);
    let memory = Arc::new(InMemoryTranslationMemory::new());
    let pipeline = pipeline_with(&client, memory.clone(), Glossary::new(), plain_options());

    let result = pipeline.translate_text("one $X$ two").await.unwrap();

    assert_eq!(result, "[ar] one $X$ two");
    assert_eq!(memory.lookup("one"), Some("[ar] one".to_string()));
    assert!(memory.lookup("two").is_none());
    assert!(memory.lookup("one $X$ two").is_none());
}

#[tokio::test]
async fn test_testConnection_withFailingClient_shouldError() {
    let client = MockClient::failing();
    let pipeline = pipeline_with(&client, Arc::default(), Glossary::new(), plain_options());

    assert!(pipeline.test_connection().await.is_err());
}
