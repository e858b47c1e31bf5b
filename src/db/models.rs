//! Database models for stored games and their move logs.

use std::str::FromStr;

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_more::Display;
use derive_new::new;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::Mark;
use crate::db::{schema, DbError};
use crate::replay::RecordedMove;

/// A stored game row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameRecord {
    id: i32,
    board_size: i32,
    player_x_name: String,
    player_o_name: String,
    winner: Option<String>,
    draw: bool,
    started_at: NaiveDateTime,
    finished_at: Option<NaiveDateTime>,
}

impl GameRecord {
    /// Parses the winner/draw columns into a [`GameOutcome`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the columns are inconsistent (winner set and
    /// draw flagged) or the winner text is not a mark.
    pub fn outcome(&self) -> Result<GameOutcome, DbError> {
        match (self.winner.as_deref(), self.draw) {
            (Some(winner), true) => Err(DbError::new(format!(
                "game {} is inconsistent: winner '{}' recorded on a draw",
                self.id, winner
            ))),
            (Some(winner), false) => {
                let mark = Mark::from_str(winner).map_err(|_| {
                    DbError::new(format!("game {} has invalid winner '{}'", self.id, winner))
                })?;
                Ok(GameOutcome::Won(mark))
            }
            (None, true) => Ok(GameOutcome::Draw),
            (None, false) => Ok(GameOutcome::Undetermined),
        }
    }
}

/// Insertable game model for registering a new game.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::games)]
pub struct NewGameRecord {
    board_size: i32,
    player_x_name: String,
    player_o_name: String,
}

/// A stored move row.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::moves)]
#[diesel(belongs_to(GameRecord, foreign_key = game_id))]
pub struct MoveRecord {
    id: i32,
    game_id: i32,
    mark: String,
    row: i32,
    col: i32,
    sequence: i32,
}

impl MoveRecord {
    /// Converts this row into the replay engine's representation.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the mark text, coordinates or sequence number
    /// cannot be represented (corrupted row).
    pub fn to_recorded(&self) -> Result<RecordedMove, DbError> {
        let mark = Mark::from_str(&self.mark)
            .map_err(|_| DbError::new(format!("move {} has invalid mark '{}'", self.id, self.mark)))?;
        let row = usize::try_from(self.row)
            .map_err(|_| DbError::new(format!("move {} has negative row {}", self.id, self.row)))?;
        let col = usize::try_from(self.col)
            .map_err(|_| DbError::new(format!("move {} has negative col {}", self.id, self.col)))?;
        let sequence = u32::try_from(self.sequence).map_err(|_| {
            DbError::new(format!(
                "move {} has negative sequence {}",
                self.id, self.sequence
            ))
        })?;
        Ok(RecordedMove {
            mark,
            row,
            col,
            sequence,
        })
    }
}

/// Insertable move model for appending to a game's move log.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::moves)]
pub struct NewMoveRecord {
    game_id: i32,
    mark: String,
    row: i32,
    col: i32,
    sequence: i32,
}

/// Outcome stored with a game record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum GameOutcome {
    /// The given mark won.
    #[display("won by {_0}")]
    Won(Mark),
    /// The game ended in a draw.
    #[display("draw")]
    Draw,
    /// The game was never finalized.
    #[display("unfinished")]
    Undetermined,
}
