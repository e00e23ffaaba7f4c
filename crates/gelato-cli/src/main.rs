//! Gelato Base CLI - log flavours and read the numbers from the terminal
//!
//! Every command talks to the entry API and falls back to the local cache
//! when the API cannot be reached.

mod cli;
mod commands;
mod error;

use clap::Parser;
use gelato_core::ShopFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::{run_add, AddArgs};
use crate::commands::common::Context;
use crate::commands::delete::run_delete;
use crate::commands::list::run_list;
use crate::commands::stats::run_stats;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gelato=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = Context::resolve(cli.api_url, cli.cache_path)?;

    match cli.command {
        Commands::List { shop, json } => {
            run_list(&ShopFilter::from(shop.as_str()), json, &ctx).await?;
        }
        Commands::Add {
            flavors,
            person,
            shop,
            date,
            notes,
        } => {
            let args = AddArgs {
                flavors: &flavors,
                person: &person,
                shop: shop.as_deref(),
                date: date.as_deref(),
                notes: notes.as_deref(),
            };
            run_add(&args, &ctx).await?;
        }
        Commands::Delete { id, password } => {
            run_delete(&id, password, &ctx).await?;
        }
        Commands::Stats { shop, json } => {
            run_stats(&ShopFilter::from(shop.as_str()), json, &ctx).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
