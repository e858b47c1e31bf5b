//! Session observer that persists the game as it is played.

use anyhow::{Context, Result};
use tracing::info;

use crate::board::Board;
use crate::db::{DbError, GameRepository};
use crate::session::{Outcome, PlacedMove, SessionObserver};

/// Writes session events through a [`GameRepository`].
///
/// The game row is created once, up front; every accepted move is appended
/// with its sequence number, and the terminal event finalizes the row. The
/// recorder never retries a failed write; a persistence failure aborts the
/// session run.
pub struct GameRecorder {
    repository: GameRepository,
    game_id: i32,
}

impl GameRecorder {
    /// Registers a new game and binds a recorder to its id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the game row cannot be created.
    pub fn create(
        repository: GameRepository,
        board_size: usize,
        player_x_name: &str,
        player_o_name: &str,
    ) -> Result<Self, DbError> {
        let record = repository.create_game(
            board_size,
            player_x_name.to_string(),
            player_o_name.to_string(),
        )?;
        let game_id = *record.id();
        info!(game_id, "Recording game");
        Ok(Self {
            repository,
            game_id,
        })
    }

    /// The id allocated for this game at creation.
    pub fn game_id(&self) -> i32 {
        self.game_id
    }
}

impl SessionObserver for GameRecorder {
    fn move_applied(&mut self, _board: &Board, mv: &PlacedMove) -> Result<()> {
        self.repository
            .record_move(self.game_id, mv.mark, mv.row, mv.col, mv.sequence)
            .with_context(|| format!("failed to persist move {}", mv.sequence))?;
        Ok(())
    }

    fn game_ended(&mut self, _board: &Board, outcome: Outcome) -> Result<()> {
        self.repository
            .finalize_game(self.game_id, outcome.winner(), outcome.is_draw())
            .context("failed to finalize game")?;
        Ok(())
    }
}
