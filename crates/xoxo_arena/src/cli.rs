//! Command-line interface for xoxo_arena.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use xoxo_arena::MatchMode;

/// XOXO Arena - tic-tac-toe series, computer opponent and online lobby
#[derive(Parser, Debug)]
#[command(name = "xoxo_arena")]
#[command(about = "Tic-tac-toe match engine with local, computer and online play", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (defaults apply if it doesn't exist)
    #[arg(long, global = true, default_value = "xoxo_arena.toml")]
    pub config: PathBuf,

    /// Override the database file from the config
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Override the user id from the config
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play interactively on stdin/stdout
    Play {
        /// Local mode to start in (pvp or pvc)
        #[arg(short, long, default_value = "pvc")]
        mode: MatchMode,
    },

    /// Show the user's match records and summary
    History,

    /// List open online games
    Lobby,
}
