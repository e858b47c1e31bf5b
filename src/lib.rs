//! NxN tic-tac-toe against a random computer opponent.
//!
//! # Architecture
//!
//! - **Board**: grid state, move validation, win/draw detection
//! - **Player**: prompt-driven human and random computer move sources
//! - **Session**: turn engine sequencing the two players and notifying
//!   observers (console view, database recorder) of every accepted move
//! - **Replay**: deterministic reconstruction of a stored game, one board
//!   snapshot per move, with paced and cancellable playback
//! - **Db**: SQLite persistence of game records and move logs
//!
//! # Example
//!
//! ```no_run
//! use noughts::{GameOutcome, Mark, RecordedMove, Replay};
//!
//! # fn main() -> Result<(), noughts::ReplayError> {
//! let moves = vec![RecordedMove { mark: Mark::X, row: 0, col: 0, sequence: 1 }];
//! let replay = Replay::new(3, moves, GameOutcome::Undetermined)?;
//! for frame in replay {
//!     let frame = frame?;
//!     println!("move {} by {}", frame.mv.sequence, frame.mv.mark);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod cli;
mod console;
mod db;
mod player;
mod replay;
mod session;

// Crate-level exports - board and rules
pub use board::{Board, BoardError, Cell, Mark, MAX_SIZE, MIN_SIZE};

// Crate-level exports - CLI surface
pub use cli::{Cli, Command};

// Crate-level exports - presentation
pub use console::{ConsoleView, Presenter};

// Crate-level exports - persistence
pub use db::{
    DbError, GameOutcome, GameRecord, GameRecorder, GameRepository, MoveRecord, NewGameRecord,
    NewMoveRecord,
};

// Crate-level exports - players
pub use player::{assign_marks, ComputerPlayer, HumanPlayer, Player, PlayerError, PlayerKind};

// Crate-level exports - replay
pub use replay::{play_back, PlaybackStatus, RecordedMove, Replay, ReplayError, ReplayFrame};

// Crate-level exports - turn engine
pub use session::{GameSession, Outcome, PlacedMove, SessionObserver, SessionStatus};
