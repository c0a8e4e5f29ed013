//! # qbot-handlers
//!
//! Message handling for the question-answering bot: conversation assembly
//! from channel history, the answer handler (trigger detection, relevance
//! filter, retrieval), and the response relay for batched and streamed
//! replies.

mod answer_handler;
mod conversation;
pub mod mention;
mod relay;

pub use answer_handler::{AnswerHandler, AnswerSettings};
pub use conversation::build_conversation;
pub use relay::StreamRelay;
