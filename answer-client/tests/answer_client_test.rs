//! Integration tests for [`answer_client::HttpAnswerClient`] against a local
//! mock HTTP server. No real backend is contacted.
//!
//! Covers: batched retrieval, streaming word delivery, non-200 and transport
//! failures, relevance evaluation, and account info.

use std::sync::{Arc, Mutex};

use answer_client::{
    AnswerBackend, AnswerError, ChatMessage, HttpAnswerClient, WordCallback,
};

const SSE_BODY: &str = "data: {\"answer\": \"hello \"}\n\
                        data: {\"answer\": \"wor\"}\n\
                        not an sse line\n\
                        data: {\"answer\": \"ld, how are \"}\n\
                        data: {\"answer\": \"you?\"}\n\
                        data: {\"answer\": \"[DONE]\"}\n";

const FULL_ANSWER: &str = "hello world, how are you?";

/// Builds a word callback that appends every delivered word to `sink`.
fn collecting_callback(sink: Arc<Mutex<Vec<String>>>) -> Box<WordCallback> {
    Box::new(move |word: String| {
        let sink = sink.clone();
        Box::pin(async move {
            sink.lock().unwrap().push(word);
            Ok(())
        })
    })
}

/// **Test: batched retrieval decodes the SSE-framed body, skips malformed
/// lines and the `[DONE]` sentinel, and returns the concatenated answer.**
#[tokio::test]
async fn batched_answer_concatenates_fragments() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/chat/premium_message")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_body(SSE_BODY)
        .create_async()
        .await;

    let client = HttpAnswerClient::new(server.url(), "test-token");
    let answer = client
        .answer(vec![ChatMessage::user("how are you?")])
        .await
        .unwrap();

    assert_eq!(answer, FULL_ANSWER);
    mock.assert_async().await;
}

/// **Test: the request payload pins greedy sampling and carries the
/// conversation with lowercase roles.**
#[tokio::test]
async fn request_payload_is_deterministic() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/chat/premium_message")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "model": "ofCourse",
            "stream": false,
            "temperature": 0.0,
            "presence_penalty": 0.0,
            "frequency_penalty": 0.0,
            "top_p": 0.0,
            "messages": [
                {"role": "assistant", "content": "earlier reply"},
                {"role": "user", "content": "alice: follow-up"}
            ]
        })))
        .with_status(200)
        .with_body("data: {\"answer\": \"ok\"}\n")
        .create_async()
        .await;

    let client = HttpAnswerClient::new(server.url(), "test-token");
    let conversation = vec![
        ChatMessage::assistant("earlier reply"),
        ChatMessage::user("alice: follow-up"),
    ];
    let answer = client.answer(conversation).await.unwrap();

    assert_eq!(answer, "ok");
    mock.assert_async().await;
}

/// **Test: streaming delivers whole words in order and returns the same full
/// text as the batched variant for the same body.**
#[tokio::test]
async fn streaming_answer_emits_words_and_full_text() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/chat/premium_message")
        .with_status(200)
        .with_body(SSE_BODY)
        .create_async()
        .await;

    let client = HttpAnswerClient::new(server.url(), "test-token");
    let words = Arc::new(Mutex::new(Vec::new()));
    let mut callback = collecting_callback(words.clone());

    let full = client
        .answer_stream(vec![ChatMessage::user("how are you?")], callback.as_mut())
        .await
        .unwrap();

    assert_eq!(full, FULL_ANSWER);
    assert_eq!(
        *words.lock().unwrap(),
        vec!["hello", "world,", "how", "are", "you?"]
    );
    // Round-trip: streamed words rejoin into the batched text.
    assert_eq!(words.lock().unwrap().join(" "), FULL_ANSWER);
}

/// **Test: a body without the `[DONE]` sentinel still completes; the trailing
/// word is flushed at end of body.**
#[tokio::test]
async fn streaming_without_sentinel_flushes_trailing_word() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/chat/premium_message")
        .with_status(200)
        .with_body("data: {\"answer\": \"half fin\"}\ndata: {\"answer\": \"ished\"}")
        .create_async()
        .await;

    let client = HttpAnswerClient::new(server.url(), "test-token");
    let words = Arc::new(Mutex::new(Vec::new()));
    let mut callback = collecting_callback(words.clone());

    let full = client
        .answer_stream(vec![ChatMessage::user("q")], callback.as_mut())
        .await
        .unwrap();

    assert_eq!(full, "half finished");
    assert_eq!(*words.lock().unwrap(), vec!["half", "finished"]);
}

/// **Test: a non-200 status maps to `AnswerError::HttpStatus` carrying the
/// code, and its rendering contains the code.**
#[tokio::test]
async fn non_200_status_is_reported_not_parsed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/chat/premium_message")
        .with_status(500)
        .with_body("internal")
        .create_async()
        .await;

    let client = HttpAnswerClient::new(server.url(), "test-token");
    let err = client.answer_question("q").await.unwrap_err();

    match err {
        AnswerError::HttpStatus(code) => assert_eq!(code, 500),
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert!(err.to_string().contains("500"));
}

/// **Test: a connection failure maps to `AnswerError::Network`.**
#[tokio::test]
async fn connection_failure_is_a_network_error() {
    // Nothing listens on this port.
    let client = HttpAnswerClient::new("http://127.0.0.1:9", "test-token");
    let err = client.answer_question("q").await.unwrap_err();
    assert!(matches!(err, AnswerError::Network(_)));
    assert!(err.to_string().starts_with("network-error: "));
}

/// **Test: relevance evaluation returns the verdict and explanation from the
/// logical-statement endpoint.**
#[tokio::test]
async fn relevance_verdict_round_trips() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/evaluate-logical-statement")
        .with_status(200)
        .with_body(r#"{"is_true": false, "explanation": "off topic"}"#)
        .create_async()
        .await;

    let client = HttpAnswerClient::new(server.url(), "test-token");
    let verdict = client.evaluate_relevance("what is the meaning of life").await.unwrap();

    assert!(!verdict.is_relevant);
    assert_eq!(verdict.explanation, "off topic");
}

/// **Test: account info deserializes the optional profile fields.**
#[tokio::test]
async fn account_info_is_fetched() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/user/getUserInfo")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_body(r#"{"email": "bot@example.edu", "credits": 41, "nickname": "qbot"}"#)
        .create_async()
        .await;

    let client = HttpAnswerClient::new(server.url(), "test-token");
    let account = client.fetch_account_info().await.unwrap();

    assert_eq!(account.email.as_deref(), Some("bot@example.edu"));
    assert_eq!(account.credits, Some(41));
    assert!(account.description.is_none());
}
