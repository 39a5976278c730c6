//! Petstore CLI - database migrations and token tooling.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! petstore-cli migrate
//!
//! # Print a bearer token for manual API calls
//! petstore-cli token --username alice
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `token` - Issue a signed bearer token

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "petstore-cli")]
#[command(author, version, about = "Petstore CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Issue a bearer token
    Token {
        /// Username carried in the token's claims
        #[arg(short, long)]
        username: String,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so `token` output stays pipeable
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Token { username } => commands::token::issue(&username)?,
    }
    Ok(())
}
