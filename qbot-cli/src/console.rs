//! Console transport: a stdin/stdout chat platform for local runs.

use async_trait::async_trait;
use chrono::Utc;
use qbot_core::{Channel, ChatPlatform, HistoryEntry, Message, Result, User};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::info;

use handler_chain::HandlerChain;

const CONSOLE_CHANNEL: i64 = 1;
const CONSOLE_USER: i64 = 100;

/// In-memory chat platform. Messages go to stdout; per-channel history backs
/// `fetch_history` so conversation assembly works like on a real platform.
pub struct ConsoleChat {
    bot_name: String,
    history: Mutex<HashMap<i64, Vec<(u64, HistoryEntry)>>>,
    next_message_id: AtomicU64,
    next_channel_id: AtomicI64,
}

impl ConsoleChat {
    pub fn new(bot_name: String) -> Self {
        Self {
            bot_name,
            history: Mutex::new(HashMap::new()),
            next_message_id: AtomicU64::new(1),
            next_channel_id: AtomicI64::new(CONSOLE_CHANNEL + 1),
        }
    }

    fn record(&self, channel: &Channel, id: u64, author_name: &str, from_bot: bool, content: &str) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.entry(channel.id).or_default().push((
            id,
            HistoryEntry {
                author_name: author_name.to_string(),
                from_bot,
                content: content.to_string(),
            },
        ));
    }

    fn next_id(&self) -> u64 {
        self.next_message_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl ChatPlatform for ConsoleChat {
    async fn send_message(&self, channel: &Channel, text: &str) -> Result<()> {
        println!("[#{}] {}: {}", channel.id, self.bot_name, text);
        self.record(channel, self.next_id(), &self.bot_name, true, text);
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.channel, text).await
    }

    async fn send_message_and_return_id(&self, channel: &Channel, text: &str) -> Result<String> {
        let id = self.next_id();
        println!("[#{}] {}: {}", channel.id, self.bot_name, text);
        self.record(channel, id, &self.bot_name, true, text);
        Ok(id.to_string())
    }

    async fn edit_message(&self, channel: &Channel, message_id: &str, text: &str) -> Result<()> {
        // A real platform edits in place; the console shows each revision.
        println!(
            "[#{}] {} (edit {}): {}",
            channel.id, self.bot_name, message_id, text
        );
        Ok(())
    }

    async fn fetch_history(
        &self,
        channel: &Channel,
        before_message_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>> {
        let before: u64 = before_message_id.parse().unwrap_or(u64::MAX);
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        let entries = history
            .get(&channel.id)
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .filter(|(id, _)| *id < before)
                    .take(limit)
                    .map(|(_, entry)| entry.clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(entries)
    }

    async fn create_thread(&self, channel: &Channel, name: &str) -> Result<Channel> {
        let thread = Channel {
            id: self.next_channel_id.fetch_add(1, Ordering::Relaxed),
        };
        println!("[#{}] thread created: #{} ({})", channel.id, thread.id, name);
        Ok(thread)
    }
}

/// Reads stdin lines, turns each into a [`Message`], and runs it through the
/// chain. `#<id> text` addresses a specific channel (threads); bare lines go
/// to the main channel.
pub async fn run_repl(console: &ConsoleChat, chain: &HandlerChain) -> anyhow::Result<()> {
    let stdin = io::stdin();
    println!("qbot console. Ctrl-D to exit.");
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            info!("stdin closed, shutting down");
            return Ok(());
        }
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let (channel_id, content) = match line.strip_prefix('#').and_then(|r| r.split_once(' ')) {
            Some((id, text)) => match id.parse::<i64>() {
                Ok(id) => (id, text.to_string()),
                Err(_) => (CONSOLE_CHANNEL, line.to_string()),
            },
            None => (CONSOLE_CHANNEL, line.to_string()),
        };

        let id = console.next_id();
        let message = Message {
            id: id.to_string(),
            user: User {
                id: CONSOLE_USER,
                name: "console".to_string(),
                is_bot: false,
            },
            channel: Channel { id: channel_id },
            content: content.clone(),
            created_at: Utc::now(),
        };
        console.record(&message.channel, id, &message.user.name, false, &content);

        if let Err(e) = chain.handle(&message).await {
            tracing::error!(error = %e, "Handler chain failed");
        }
    }
}
