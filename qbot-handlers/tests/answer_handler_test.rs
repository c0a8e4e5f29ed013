//! Integration tests for [`qbot_handlers::AnswerHandler`] and
//! [`qbot_handlers::build_conversation`].
//!
//! Uses in-memory mocks for the platform and the answer backend; no network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use answer_client::{AnswerBackend, AnswerError, ChatMessage, Relevance, Role, WordCallback};
use async_trait::async_trait;
use chrono::Utc;
use qbot_core::{
    Channel, ChatPlatform, Handler, HandlerResponse, HistoryEntry, Message,
    Result as QbotResult, QbotError, User,
};
use qbot_handlers::{build_conversation, AnswerHandler, AnswerSettings};

// ---------- Mocks ----------

/// Records every send/reply/edit; serves canned history newest-first.
#[derive(Default)]
struct MockPlatform {
    sent: Mutex<Vec<String>>,
    edits: Mutex<Vec<String>>,
    history: Vec<HistoryEntry>,
    fail_edits: bool,
}

impl MockPlatform {
    fn with_history(history: Vec<HistoryEntry>) -> Self {
        Self {
            history,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn send_message(&self, _channel: &Channel, text: &str) -> QbotResult<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn reply_to(&self, _message: &Message, text: &str) -> QbotResult<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_message_and_return_id(
        &self,
        _channel: &Channel,
        text: &str,
    ) -> QbotResult<String> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok("placeholder-1".to_string())
    }

    async fn edit_message(
        &self,
        _channel: &Channel,
        _message_id: &str,
        text: &str,
    ) -> QbotResult<()> {
        if self.fail_edits {
            return Err(QbotError::Platform("edit rejected".to_string()));
        }
        self.edits.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn fetch_history(
        &self,
        _channel: &Channel,
        _before_message_id: &str,
        limit: usize,
    ) -> QbotResult<Vec<HistoryEntry>> {
        Ok(self.history.iter().take(limit).cloned().collect())
    }

    async fn create_thread(&self, _channel: &Channel, _name: &str) -> QbotResult<Channel> {
        Ok(Channel { id: 999 })
    }
}

/// Scripted backend: fixed answer or failure status, fixed relevance verdict.
struct MockBackend {
    answer_text: String,
    fail_status: Option<u16>,
    relevant: bool,
    relevance_calls: AtomicUsize,
    conversations: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockBackend {
    fn answering(text: &str) -> Self {
        Self {
            answer_text: text.to_string(),
            fail_status: None,
            relevant: true,
            relevance_calls: AtomicUsize::new(0),
            conversations: Mutex::new(Vec::new()),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::answering("")
        }
    }

    fn irrelevant() -> Self {
        Self {
            relevant: false,
            ..Self::answering("unused")
        }
    }
}

#[async_trait]
impl AnswerBackend for MockBackend {
    async fn answer(&self, conversation: Vec<ChatMessage>) -> Result<String, AnswerError> {
        self.conversations.lock().unwrap().push(conversation);
        match self.fail_status {
            Some(code) => Err(AnswerError::HttpStatus(code)),
            None => Ok(self.answer_text.clone()),
        }
    }

    async fn answer_stream(
        &self,
        conversation: Vec<ChatMessage>,
        on_word: &mut WordCallback,
    ) -> Result<String, AnswerError> {
        self.conversations.lock().unwrap().push(conversation);
        if let Some(code) = self.fail_status {
            return Err(AnswerError::HttpStatus(code));
        }
        for word in self.answer_text.split(' ') {
            on_word(word.to_string())
                .await
                .map_err(|e| AnswerError::Platform(e.to_string()))?;
        }
        Ok(self.answer_text.clone())
    }

    async fn evaluate_relevance(&self, _text: &str) -> Result<Relevance, AnswerError> {
        self.relevance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Relevance {
            is_relevant: self.relevant,
            explanation: "scripted verdict".to_string(),
        })
    }
}

// ---------- Helpers ----------

fn incoming(content: &str) -> Message {
    Message {
        id: "42".to_string(),
        user: User {
            id: 7,
            name: "alice".to_string(),
            is_bot: false,
        },
        channel: Channel { id: 11 },
        content: content.to_string(),
        created_at: Utc::now(),
    }
}

fn settings(streaming: bool) -> AnswerSettings {
    AnswerSettings {
        bot_name: "qbot".to_string(),
        use_streaming: streaming,
        history_window: 10,
        relevance_filter_enabled: true,
        thinking_message: "Thinking...".to_string(),
        follow_up_message: None,
    }
}

fn entry(author: &str, from_bot: bool, content: &str) -> HistoryEntry {
    HistoryEntry {
        author_name: author.to_string(),
        from_bot,
        content: content.to_string(),
    }
}

// ---------- Conversation assembly ----------

/// **Test: 3 prior messages (newest-first) with window 5 become 4 entries in
/// chronological order, bot turns tagged assistant, user turns name-prefixed,
/// current message last.**
#[tokio::test]
async fn conversation_is_chronological_and_tagged() {
    let platform = MockPlatform::with_history(vec![
        entry("qbot", true, "42"),
        entry("bob", false, "what is 6 times 7"),
        entry("alice", false, "hi all"),
    ]);
    let message = incoming("are you sure?");

    let conversation = build_conversation(&platform, &message, 5).await;

    assert_eq!(conversation.len(), 4);
    assert_eq!(conversation[0], ChatMessage::user("alice: hi all"));
    assert_eq!(conversation[1], ChatMessage::user("bob: what is 6 times 7"));
    assert_eq!(conversation[2], ChatMessage::assistant("42"));
    assert_eq!(conversation[3], ChatMessage::user("are you sure?"));
}

/// **Test: the history window caps how much history is requested.**
#[tokio::test]
async fn conversation_respects_window() {
    let platform = MockPlatform::with_history(vec![
        entry("bob", false, "third"),
        entry("bob", false, "second"),
        entry("bob", false, "first"),
    ]);
    let message = incoming("now?");

    let conversation = build_conversation(&platform, &message, 2).await;

    assert_eq!(conversation.len(), 3);
    assert_eq!(conversation[0], ChatMessage::user("bob: second"));
    assert_eq!(conversation[2].role, Role::User);
    assert_eq!(conversation[2].content, "now?");
}

/// **Test: window 0 skips history entirely.**
#[tokio::test]
async fn conversation_without_history() {
    let platform = MockPlatform::with_history(vec![entry("bob", false, "old")]);
    let message = incoming("fresh?");

    let conversation = build_conversation(&platform, &message, 0).await;

    assert_eq!(conversation, vec![ChatMessage::user("fresh?")]);
}

// ---------- Batched path ----------

/// **Test: a relevant question is answered with one reply carrying the full
/// text; the handler returns Reply.**
#[tokio::test]
async fn batched_question_is_answered() {
    let platform = Arc::new(MockPlatform::default());
    let backend = Arc::new(MockBackend::answering("it starts in week 1"));
    let handler = AnswerHandler::new(platform.clone(), backend.clone(), settings(false));

    let response = handler
        .handle(&incoming("when does COMP1511 start?"))
        .await
        .unwrap();

    assert_eq!(
        response,
        HandlerResponse::Reply("it starts in week 1".to_string())
    );
    assert_eq!(
        *platform.sent.lock().unwrap(),
        vec!["it starts in week 1".to_string()]
    );
    assert_eq!(backend.relevance_calls.load(Ordering::SeqCst), 1);
    let conversations = backend.conversations.lock().unwrap();
    assert_eq!(
        conversations[0].last(),
        Some(&ChatMessage::user("when does COMP1511 start?"))
    );
}

/// **Test: a mention is answered without consulting the relevance filter.**
#[tokio::test]
async fn mention_bypasses_relevance_filter() {
    let platform = Arc::new(MockPlatform::default());
    let backend = Arc::new(MockBackend::answering("hello alice"));
    let handler = AnswerHandler::new(platform.clone(), backend.clone(), settings(false));

    let response = handler.handle(&incoming("@qbot hello there")).await.unwrap();

    assert_eq!(response, HandlerResponse::Reply("hello alice".to_string()));
    assert_eq!(backend.relevance_calls.load(Ordering::SeqCst), 0);
}

/// **Test: a message that is neither a mention nor a question passes through.**
#[tokio::test]
async fn plain_chatter_is_ignored() {
    let platform = Arc::new(MockPlatform::default());
    let backend = Arc::new(MockBackend::answering("unused"));
    let handler = AnswerHandler::new(platform.clone(), backend.clone(), settings(false));

    let response = handler
        .handle(&incoming("see you all tomorrow"))
        .await
        .unwrap();

    assert_eq!(response, HandlerResponse::Continue);
    assert!(platform.sent.lock().unwrap().is_empty());
    assert!(backend.conversations.lock().unwrap().is_empty());
}

/// **Test: a non-relevant question is dropped silently: no reply, no
/// retrieval, chain stopped.**
#[tokio::test]
async fn irrelevant_question_is_dropped_silently() {
    let platform = Arc::new(MockPlatform::default());
    let backend = Arc::new(MockBackend::irrelevant());
    let handler = AnswerHandler::new(platform.clone(), backend.clone(), settings(false));

    let response = handler
        .handle(&incoming("what is the meaning of life?"))
        .await
        .unwrap();

    assert_eq!(response, HandlerResponse::Stop);
    assert!(platform.sent.lock().unwrap().is_empty());
    assert!(backend.conversations.lock().unwrap().is_empty());
}

/// **Test: messages from bot accounts are never answered.**
#[tokio::test]
async fn bot_messages_are_ignored() {
    let platform = Arc::new(MockPlatform::default());
    let backend = Arc::new(MockBackend::answering("unused"));
    let handler = AnswerHandler::new(platform.clone(), backend.clone(), settings(false));

    let mut message = incoming("what time is it?");
    message.user.is_bot = true;
    let response = handler.handle(&message).await.unwrap();

    assert_eq!(response, HandlerResponse::Continue);
    assert!(backend.conversations.lock().unwrap().is_empty());
}

/// **Test: a backend 500 is rendered as a user-visible failure containing the
/// status code.**
#[tokio::test]
async fn http_failure_is_reported_in_channel() {
    let platform = Arc::new(MockPlatform::default());
    let backend = Arc::new(MockBackend::failing(500));
    let handler = AnswerHandler::new(platform.clone(), backend.clone(), settings(false));

    let response = handler
        .handle(&incoming("when is the exam?"))
        .await
        .unwrap();

    assert_eq!(response, HandlerResponse::Stop);
    let sent = platform.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("500"), "got: {}", sent[0]);
    assert!(sent[0].starts_with("http-status:"));
}

/// **Test: the optional follow-up message is sent after a successful answer.**
#[tokio::test]
async fn follow_up_is_sent_after_success() {
    let platform = Arc::new(MockPlatform::default());
    let backend = Arc::new(MockBackend::answering("done"));
    let mut cfg = settings(false);
    cfg.follow_up_message = Some("For better service, visit the portal.".to_string());
    let handler = AnswerHandler::new(platform.clone(), backend, cfg);

    handler.handle(&incoming("is it due today?")).await.unwrap();

    assert_eq!(
        *platform.sent.lock().unwrap(),
        vec![
            "done".to_string(),
            "For better service, visit the portal.".to_string()
        ]
    );
}

// ---------- Streaming path ----------

/// **Test: streaming sends the placeholder, then edits a growing buffer; the
/// final display equals the full text plus a trailing space.**
#[tokio::test]
async fn streaming_reply_grows_in_place() {
    let platform = Arc::new(MockPlatform::default());
    let backend = Arc::new(MockBackend::answering("hello world, how are you?"));
    let handler = AnswerHandler::new(platform.clone(), backend, settings(true));

    let response = handler.handle(&incoming("@qbot how are you")).await.unwrap();

    assert_eq!(
        response,
        HandlerResponse::Reply("hello world, how are you?".to_string())
    );
    assert_eq!(*platform.sent.lock().unwrap(), vec!["Thinking...".to_string()]);

    let edits = platform.edits.lock().unwrap();
    assert_eq!(edits.first().map(String::as_str), Some("hello "));
    assert_eq!(
        edits.last().map(String::as_str),
        Some("hello world, how are you? ")
    );
    // Each edit strictly extends the previous one.
    for pair in edits.windows(2) {
        assert!(pair[1].starts_with(&pair[0]));
    }
}

/// **Test: edit failures are tolerated; the retrieval still completes with
/// the full text.**
#[tokio::test]
async fn streaming_tolerates_edit_failures() {
    let platform = Arc::new(MockPlatform {
        fail_edits: true,
        ..Default::default()
    });
    let backend = Arc::new(MockBackend::answering("still got the answer"));
    let handler = AnswerHandler::new(platform.clone(), backend, settings(true));

    let response = handler.handle(&incoming("@qbot anyone there")).await.unwrap();

    assert_eq!(
        response,
        HandlerResponse::Reply("still got the answer".to_string())
    );
}

/// **Test: a streaming failure overwrites the placeholder with the rendered
/// failure (category + code).**
#[tokio::test]
async fn streaming_failure_replaces_placeholder() {
    let platform = Arc::new(MockPlatform::default());
    let backend = Arc::new(MockBackend::failing(503));
    let handler = AnswerHandler::new(platform.clone(), backend, settings(true));

    let response = handler.handle(&incoming("@qbot hello")).await.unwrap();

    assert_eq!(response, HandlerResponse::Stop);
    let edits = platform.edits.lock().unwrap();
    assert_eq!(edits.len(), 1);
    assert!(edits[0].contains("503"));
}
