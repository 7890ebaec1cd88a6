//! PinBank Banking Agent
//!
//! An interactive banking assistant over stdin/stdout. The model decides
//! when to invoke the four banking tools; the conversation is persisted to
//! SQLite keyed by session id, so a session can be resumed.
//!
//! Logs go to stderr so the conversation on stdout stays clean.
//!
//! # Usage
//!
//! ```bash
//! # Default session against the provider configured via PINBANK_LLM_*
//! pinbank-chat
//!
//! # Resume a named session with demo accounts present
//! pinbank-chat --session my-session --seed
//! ```

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

use pinbank_agent::{AgentRunner, OpenAiCompatProvider, SqliteSessionStore};
use pinbank_ledger::Ledger;

/// PinBank banking agent - conversational front-end over the ledger
#[derive(Parser, Debug)]
#[command(name = "pinbank-chat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session identifier; reusing an id resumes its conversation
    #[arg(long, env = "PINBANK_SESSION", default_value = "bankingSession123")]
    session: String,

    /// Path to the session database
    #[arg(long, env = "PINBANK_SESSION_DB", default_value = "pinbank_sessions.db")]
    session_db: String,

    /// Seed demo accounts (alice/1111 with 100, bob/2222 with 50)
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs to stderr; stdout carries the conversation
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let ledger = Ledger::new();
    if args.seed {
        ledger.upsert("alice", "1111", dec!(100)).await?;
        ledger.upsert("bob", "2222", dec!(50)).await?;
        tracing::info!("seeded demo accounts alice and bob");
    }

    let provider = Arc::new(OpenAiCompatProvider::from_env());
    let store = Arc::new(SqliteSessionStore::open(&args.session_db).await?);
    let runner = AgentRunner::new(provider, ledger, store);

    println!("Banking Agent is now active. Type 'exit' to end the session.");
    println!("---------------------------------------------------------");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("You: ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            println!("Ending session. Goodbye!");
            break;
        }

        match runner.run(&args.session, input).await {
            Ok(reply) => println!("Agent: {reply}"),
            Err(e) => {
                tracing::error!("agent turn failed: {e}");
                println!("Agent: Sorry, something went wrong: {e}");
            }
        }
    }

    Ok(())
}
