mod cli;
mod console;

use answer_client::{EnvAnswerConfig, HttpAnswerClient};
use clap::Parser;
use cli::{Cli, Commands};
use console::ConsoleChat;
use handler_chain::HandlerChain;
use qbot_handlers::{AnswerHandler, AnswerSettings};
use scheduler::{OpenAiAnalyzer, ScheduleHandler};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_file = std::env::var("LOG_FILE").unwrap_or_else(|_| "qbot.log".to_string());
    qbot_core::init_tracing(&log_file)?;

    let api_token = match cli.command {
        Some(Commands::Run { api_token }) => api_token,
        None => None,
    };

    let mut config = EnvAnswerConfig::from_env()?;
    if let Some(token) = api_token {
        config.api_token = token;
    }

    let mut client = HttpAnswerClient::new(&config.api_url, &config.api_token)
        .with_model(&config.model);
    if let Some(statement) = &config.relevance_statement {
        client = client.with_relevance_statement(statement);
    }

    // Startup token check; the bot still runs if the profile call fails.
    if let Err(e) = client.fetch_account_info().await {
        warn!(error = %e, "Could not fetch backend account info");
    }

    let bot_name = std::env::var("BOT_NAME").unwrap_or_else(|_| "qbot".to_string());
    let settings = AnswerSettings::from_config(bot_name.clone(), &config);
    info!(
        bot_name = %bot_name,
        streaming = settings.use_streaming,
        history_window = settings.history_window,
        relevance_filter = settings.relevance_filter_enabled,
        "Starting bot"
    );

    let platform = Arc::new(ConsoleChat::new(bot_name));
    let backend = Arc::new(client);

    let mut chain = HandlerChain::new();
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) => {
            let mut analyzer = OpenAiAnalyzer::new(key);
            if let Ok(model) = std::env::var("OPENAI_MODEL") {
                analyzer = analyzer.with_model(model);
            }
            chain = chain.add_handler(Arc::new(ScheduleHandler::new(
                platform.clone(),
                Arc::new(analyzer),
            )));
        }
        Err(_) => warn!("OPENAI_API_KEY not set; /find_time disabled"),
    }
    chain = chain.add_handler(Arc::new(AnswerHandler::new(
        platform.clone(),
        backend,
        settings,
    )));

    console::run_repl(&platform, &chain).await
}
