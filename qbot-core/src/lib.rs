//! # qbot-core
//!
//! Core types and traits for the question-answering bot: [`ChatPlatform`], [`Handler`],
//! message and user types, error taxonomy, and tracing initialization.
//! Transport-agnostic; used by handler-chain, qbot-handlers, and scheduler.

pub mod error;
pub mod logger;
pub mod platform;
pub mod types;

pub use error::{HandlerError, QbotError, Result};
pub use logger::init_tracing;
pub use platform::{ChatPlatform, HistoryEntry};
pub use types::{Channel, Handler, HandlerResponse, Message, User};
