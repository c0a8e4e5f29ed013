//! # scheduler
//!
//! Find-time feature: creates a scheduling thread, collects availability
//! messages from the mentioned participants under a wall-clock deadline, and
//! posts an LLM-generated analysis of overlapping slots after each response.

mod analyzer;
mod handler;
mod session;

pub use analyzer::{build_analysis_prompt, AvailabilityAnalyzer, OpenAiAnalyzer};
pub use handler::{parse_mentions, ScheduleHandler, FIND_TIME_COMMAND};
pub use session::{ScheduleSession, DEFAULT_COLLECTION_WINDOW};
