/*!
 * Tests for provider implementations
 */

use std::sync::atomic::{AtomicU32, Ordering};

use tarjama::errors::ProviderError;
use tarjama::providers::libretranslate::LibreTranslate;
use tarjama::providers::mock::{MockBehavior, MockClient};
use tarjama::providers::ollama::Ollama;
use tarjama::providers::{RetryPolicy, TranslationClient};

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        backoff_base_ms: 1,
    }
}

#[tokio::test]
async fn test_retryPolicy_withTransientErrors_shouldRetryUntilSuccess() {
    let attempts = AtomicU32::new(0);
    let counter = &attempts;

    let result = fast_retry(3)
        .run("Test", move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(ProviderError::ConnectionError("down".into()))
            } else {
                Ok("done")
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retryPolicy_withPermanentError_shouldNotRetry() {
    let attempts = AtomicU32::new(0);
    let counter = &attempts;

    let result: Result<(), _> = fast_retry(3)
        .run("Test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::AuthenticationError("bad key".into()))
        })
        .await;

    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retryPolicy_withExhaustedRetries_shouldReturnLastError() {
    let attempts = AtomicU32::new(0);
    let counter = &attempts;

    let result: Result<(), _> = fast_retry(2)
        .run("Test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::ApiError { status_code: 503, message: "busy".into() })
        })
        .await;

    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 503, .. })));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_mockClient_working_shouldTagTranslations() {
    let client = MockClient::working();

    let result = client.translate("Hello", "ar").await.unwrap();

    assert_eq!(result, "[ar] Hello");
    assert_eq!(client.call_count(), 1);
    assert_eq!(client.name(), "Mock");
}

#[tokio::test]
async fn test_mockClient_intermittent_shouldFailEveryNthRequest() {
    let client = MockClient::intermittent(3);

    let outcomes: Vec<bool> = {
        let mut outcomes = Vec::new();
        for _ in 0..6 {
            outcomes.push(client.translate("x", "ar").await.is_ok());
        }
        outcomes
    };

    assert_eq!(outcomes, vec![true, true, false, true, true, false]);
}

#[tokio::test]
async fn test_mockClient_withZeroFailInterval_shouldFailEveryRequest() {
    let client = MockClient::new(MockBehavior::Intermittent { fail_every: 0 });

    assert!(client.translate("x", "ar").await.is_err());
    assert!(client.translate("y", "ar").await.is_err());
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_libreTranslate_withUnreachableServer_shouldReportConnectionError() {
    let client = LibreTranslate::new("http://127.0.0.1:1", None, 2, fast_retry(0)).unwrap();

    let result = client.translate("Hello", "ar").await;

    match result {
        Err(e) => assert!(e.is_transient(), "unexpected error kind: {}", e),
        Ok(text) => panic!("expected a connection error, got {}", text),
    }
}

#[tokio::test]
async fn test_ollama_withUnreachableServer_shouldReportConnectionError() {
    let client = Ollama::new("127.0.0.1:1", "llama3.2:3b", 0.3, 2, fast_retry(0)).unwrap();

    let result = client.translate("Hello", "ar").await;

    assert!(matches!(result, Err(ProviderError::ConnectionError(_))));
}
