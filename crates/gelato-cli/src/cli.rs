use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gelato")]
#[command(about = "Log the ice-cream flavours you taste and see what the numbers say")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the entry API
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Path to the offline entry cache
    #[arg(long, global = true, value_name = "PATH")]
    pub cache_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show entries grouped by day
    #[command(alias = "ls")]
    List {
        /// Only show one shop ("all" for every shop)
        #[arg(long, default_value = "all")]
        shop: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log one or more flavours from a single visit
    Add {
        /// Flavours tasted
        #[arg(required = true)]
        flavors: Vec<String>,
        /// Who tasted them
        #[arg(long)]
        person: String,
        /// Shop visited (defaults to the primary shop)
        #[arg(long)]
        shop: Option<String>,
        /// Visit date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete an entry (admin only)
    Delete {
        /// Entry id
        id: String,
        /// Admin password (falls back to GELATO_ADMIN_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },
    /// Show tasting statistics
    Stats {
        /// Only count one shop ("all" for every shop)
        #[arg(long, default_value = "all")]
        shop: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
