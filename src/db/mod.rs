//! Database persistence layer for games and their move logs.

mod error;
mod models;
mod recorder;
mod repository;
mod schema;

pub use error::DbError;
pub use models::{GameOutcome, GameRecord, MoveRecord, NewGameRecord, NewMoveRecord};
pub use recorder::GameRecorder;
pub use repository::GameRepository;
