//! Command-line interface for noughts.

use clap::{Parser, Subcommand};

/// Noughts - NxN tic-tac-toe against the computer
#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Play NxN tic-tac-toe against the computer, with saved-game replay", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the SQLite database file (created if it doesn't exist).
    /// Defaults to $DATABASE_URL, then "noughts.db".
    #[arg(long)]
    pub db_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a new game against the computer
    New {
        /// Board size, 3 to 10
        #[arg(short = 's', long, default_value_t = 3)]
        board_size: usize,

        /// Display name for the human player
        #[arg(short = 'p', long, default_value = "Player")]
        player_name: String,
    },

    /// List all saved games, newest first
    List,

    /// Replay a saved game move by move
    Replay {
        /// Id of the game to replay
        game_id: i32,

        /// Pause between moves, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
}
