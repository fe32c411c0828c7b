//! chatdj interactive terminal
//!
//! Reads one line at a time and answers through the same assistant as the
//! HTTP `/chat` endpoint. `quit` exits.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chatdj_server::{startup, AppState};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const USAGE: &str = "\
Chatbot: Hi! Ask me anything, or tell me what to play. For example:
  play the song \"Shape of You\" by Ed Sheeran
  queue the album \"Scorpion\" by Drake
  play the podcast \"The Daily\"
Type 'quit' to exit.";

/// Command-line arguments for chatdj-cli
#[derive(Parser, Debug)]
#[command(name = "chatdj-cli")]
#[command(about = "Interactive chat-driven Spotify playback")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "CHATDJ_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (overrides `[logging] level` and CHATDJ_LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = startup::load_config(args.config.as_deref())?;
    startup::init_tracing(startup::log_level(args.log_level.as_deref(), &config));
    startup::log_startup("chatdj-cli", &source);

    let state = AppState::from_config(&config).context("Failed to initialize services")?;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(format!("{}\n", USAGE).as_bytes()).await?;

    loop {
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = state.assistant.respond(&line).await;
        stdout
            .write_all(format!("Chatbot: {}\n", reply.text).as_bytes())
            .await?;
    }

    Ok(())
}
