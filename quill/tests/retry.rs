//! RetryingLlm: transient errors are retried, schema violations are not.

mod init_logging;

use std::time::Duration;

use quill::{LlmClient, LlmError, Message, MockLlm, OutputSchema, RetryPolicy, RetryingLlm, SchemaField};

fn schema() -> OutputSchema {
    OutputSchema::new("t").field(SchemaField::string("a", "a").required())
}

#[tokio::test]
async fn retries_unavailable_then_succeeds() {
    let mock = MockLlm::new()
        .then_fail(LlmError::Unavailable("503".into()))
        .then_fail(LlmError::Timeout("slow".into()))
        .then_text("hello");
    let llm = RetryingLlm::new(mock, RetryPolicy::fixed(2, Duration::ZERO));

    let response = llm.invoke(&[Message::user("hi")]).await.unwrap();

    assert_eq!(response.content, "hello");
    assert_eq!(llm.inner().call_count(), 3);
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let mock = MockLlm::new()
        .then_fail(LlmError::Unavailable("1".into()))
        .then_fail(LlmError::Unavailable("2".into()))
        .then_fail(LlmError::Unavailable("3".into()));
    let llm = RetryingLlm::new(mock, RetryPolicy::fixed(1, Duration::ZERO));

    let err = llm.invoke(&[]).await.unwrap_err();

    assert_eq!(err, LlmError::Unavailable("2".into()));
    assert_eq!(llm.inner().call_count(), 2);
}

/// **Scenario**: a schema violation is returned at once, without another model call.
#[tokio::test]
async fn schema_violation_is_not_retried() {
    let mock = MockLlm::new().then_text("garbage").then_text(r#"{"a": "x"}"#);
    let llm = RetryingLlm::new(
        mock,
        RetryPolicy::exponential(3, Duration::ZERO, Duration::ZERO, 2.0),
    );

    let err = llm.invoke_structured("p", &schema()).await.unwrap_err();

    assert!(err.is_schema_violation());
    assert_eq!(llm.inner().call_count(), 1);
}

#[tokio::test]
async fn structured_calls_retry_transient_errors() {
    let mock = MockLlm::new()
        .then_fail(LlmError::Timeout("slow".into()))
        .then_text(r#"{"a": "x"}"#);
    let llm = RetryingLlm::new(mock, RetryPolicy::fixed(1, Duration::ZERO));

    let out = llm.invoke_structured("p", &schema()).await.unwrap();

    assert_eq!(out["a"], "x");
    assert_eq!(llm.inner().call_count(), 2);
}

#[tokio::test]
async fn no_policy_means_single_attempt() {
    let mock = MockLlm::new().then_fail(LlmError::Timeout("slow".into()));
    let llm = RetryingLlm::new(mock, RetryPolicy::none());
    assert!(llm.invoke(&[]).await.is_err());
    assert_eq!(llm.inner().call_count(), 1);
}
