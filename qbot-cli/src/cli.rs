use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qbot", about = "Course Q&A bot", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot with a console transport.
    Run {
        /// Override the API_TOKEN environment variable.
        #[arg(long)]
        api_token: Option<String>,
    },
}
