//! SQLite-backed store for games and their move logs.

use diesel::prelude::*;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, info, instrument};

use crate::board::Mark;
use crate::db::{schema, DbError, GameRecord, MoveRecord, NewGameRecord, NewMoveRecord};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Repository implementing the persistence collaborator contract: create a
/// game, append moves, finalize, and read everything back for listing and
/// replay.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository backed by the database at the given path.
    ///
    /// Use `":memory:"` for an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is invalid.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Applies any pending embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration error: {}", e)))?;
        if !applied.is_empty() {
            info!(count = applied.len(), "Applied pending migrations");
        }
        Ok(())
    }

    /// Registers a new game and returns its stored record (with id).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn create_game(
        &self,
        board_size: usize,
        player_x_name: String,
        player_o_name: String,
    ) -> Result<GameRecord, DbError> {
        debug!(board_size, "Creating game");
        let mut conn = self.connection()?;

        let new_game = NewGameRecord::new(board_size as i32, player_x_name, player_o_name);

        let game = diesel::insert_into(schema::games::table)
            .values(&new_game)
            .returning(GameRecord::as_returning())
            .get_result(&mut conn)?;

        info!(game_id = game.id(), "Game created");
        Ok(game)
    }

    /// Appends one move to a game's log.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self), fields(game_id, %mark, sequence))]
    pub fn record_move(
        &self,
        game_id: i32,
        mark: Mark,
        row: usize,
        col: usize,
        sequence: u32,
    ) -> Result<MoveRecord, DbError> {
        debug!("Recording move");
        let mut conn = self.connection()?;

        let new_move = NewMoveRecord::new(
            game_id,
            mark.to_string(),
            row as i32,
            col as i32,
            sequence as i32,
        );

        let record = diesel::insert_into(schema::moves::table)
            .values(&new_move)
            .returning(MoveRecord::as_returning())
            .get_result(&mut conn)?;

        debug!(move_id = record.id(), "Move recorded");
        Ok(record)
    }

    /// Marks a game finished, storing the winner (if any), the draw flag and
    /// the finish time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the game does not exist or a database error
    /// occurs.
    #[instrument(skip(self))]
    pub fn finalize_game(
        &self,
        game_id: i32,
        winner: Option<Mark>,
        draw: bool,
    ) -> Result<(), DbError> {
        debug!("Finalizing game");
        let mut conn = self.connection()?;

        let updated = diesel::update(schema::games::table.find(game_id))
            .set((
                schema::games::winner.eq(winner.map(|m| m.to_string())),
                schema::games::draw.eq(draw),
                schema::games::finished_at.eq(Some(chrono::Utc::now().naive_utc())),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(DbError::new(format!("game {} not found", game_id)));
        }

        info!(game_id, ?winner, draw, "Game finalized");
        Ok(())
    }

    /// Lists all stored games, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_games(&self) -> Result<Vec<GameRecord>, DbError> {
        debug!("Listing games");
        let mut conn = self.connection()?;

        let games = schema::games::table
            .order((
                schema::games::started_at.desc(),
                schema::games::id.desc(),
            ))
            .load::<GameRecord>(&mut conn)?;

        info!(count = games.len(), "Games loaded");
        Ok(games)
    }

    /// Gets a game by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: i32) -> Result<Option<GameRecord>, DbError> {
        debug!("Loading game");
        let mut conn = self.connection()?;

        let game = schema::games::table
            .find(game_id)
            .first::<GameRecord>(&mut conn)
            .optional()?;

        if game.is_none() {
            debug!(game_id, "Game not found");
        }
        Ok(game)
    }

    /// Gets a game's moves ordered by sequence number ascending.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_moves(&self, game_id: i32) -> Result<Vec<MoveRecord>, DbError> {
        debug!("Loading moves");
        let mut conn = self.connection()?;

        let moves = schema::moves::table
            .filter(schema::moves::game_id.eq(game_id))
            .order(schema::moves::sequence.asc())
            .load::<MoveRecord>(&mut conn)?;

        debug!(game_id, count = moves.len(), "Moves loaded");
        Ok(moves)
    }
}
