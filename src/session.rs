//! Turn engine sequencing one human and one computer player over a board.

use anyhow::{bail, Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::board::{Board, Mark};
use crate::player::{Player, PlayerKind};

/// A move accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedMove {
    /// Mark that was placed.
    pub mark: Mark,
    /// Row of the placed mark.
    pub row: usize,
    /// Column of the placed mark.
    pub col: usize,
    /// 1-based ordinal of this move within the game.
    pub sequence: u32,
}

/// Terminal result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The given mark completed a line.
    Won(Mark),
    /// The board filled with no winner.
    Draw,
}

impl Outcome {
    /// The winning mark, `None` for a draw.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Won(mark) => Some(*mark),
            Outcome::Draw => None,
        }
    }

    /// True iff the game ended in a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

/// Session state. Won and Draw are terminal; the status transitions at most
/// once and never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Moves are still being accepted.
    InProgress,
    /// The given mark won.
    Won(Mark),
    /// The board filled with no winner.
    Draw,
}

/// Collaborator notified of session events.
///
/// Persistence, rendering and any other consumer subscribe independently;
/// the engine knows nothing about what an observer does with an event. An
/// observer error aborts the session run.
pub trait SessionObserver: Send {
    /// A turn is about to be played by `name` with `mark`.
    fn turn_started(&mut self, board: &Board, mark: Mark, name: &str) -> Result<()> {
        let _ = (board, mark, name);
        Ok(())
    }

    /// A move was validated and applied to the board.
    fn move_applied(&mut self, board: &Board, mv: &PlacedMove) -> Result<()>;

    /// The session reached a terminal state.
    fn game_ended(&mut self, board: &Board, outcome: Outcome) -> Result<()>;
}

/// A live game: board, two players keyed by mark, and subscribed observers.
///
/// X always moves first. `move_counter` increments exactly once per accepted
/// move; an invalid move from a human source is re-requested without
/// advancing the counter or the turn.
pub struct GameSession {
    board: Board,
    player_x: Box<dyn Player>,
    player_o: Box<dyn Player>,
    to_move: Mark,
    move_counter: u32,
    status: SessionStatus,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl GameSession {
    /// Creates a session from a board and two players, one per mark.
    ///
    /// # Errors
    ///
    /// Fails if the two players do not cover both marks.
    pub fn new(board: Board, first: Box<dyn Player>, second: Box<dyn Player>) -> Result<Self> {
        let (player_x, player_o) = match (first.mark(), second.mark()) {
            (Mark::X, Mark::O) => (first, second),
            (Mark::O, Mark::X) => (second, first),
            (a, b) => bail!("players must cover both marks, got {a} and {b}"),
        };
        Ok(Self {
            board,
            player_x,
            player_o,
            to_move: Mark::X,
            move_counter: 0,
            status: SessionStatus::InProgress,
            observers: Vec::new(),
        })
    }

    /// Subscribes an observer to this session's events.
    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Returns the current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the session status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Number of moves accepted so far.
    pub fn move_counter(&self) -> u32 {
        self.move_counter
    }

    /// Runs the session to completion and returns the outcome.
    ///
    /// # Errors
    ///
    /// Fails if the session already finished, if a player fails to produce a
    /// move, if a computer-sourced move is invalid (an engine bug, not a game
    /// condition), or if an observer rejects an event.
    #[instrument(skip(self), fields(size = self.board.size()))]
    pub async fn run(&mut self) -> Result<Outcome> {
        if self.status != SessionStatus::InProgress {
            bail!("session already finished with {:?}", self.status);
        }

        info!(
            player_x = self.player_x.name(),
            player_o = self.player_o.name(),
            "Starting game"
        );

        loop {
            let mark = self.to_move;
            let name = self.current_player_name().to_string();
            for observer in &mut self.observers {
                observer.turn_started(&self.board, mark, &name)?;
            }

            let (row, col) = self.obtain_move(mark).await?;
            self.board
                .place(row, col, mark)
                .context("engine accepted a move the board rejected")?;
            self.move_counter += 1;

            let mv = PlacedMove {
                mark,
                row,
                col,
                sequence: self.move_counter,
            };
            debug!(?mv, "Move applied");
            for observer in &mut self.observers {
                observer.move_applied(&self.board, &mv)?;
            }

            if self.board.check_win(mark) {
                self.status = SessionStatus::Won(mark);
                return self.finish(Outcome::Won(mark));
            }
            if self.board.is_full() {
                self.status = SessionStatus::Draw;
                return self.finish(Outcome::Draw);
            }

            self.to_move = mark.opponent();
        }
    }

    /// Requests moves from the current player until one is valid.
    ///
    /// Invalid moves from a human source are discarded and re-requested; the
    /// players validate at the edge as well, so this is the engine-side guard
    /// for any front end that does not.
    async fn obtain_move(&mut self, mark: Mark) -> Result<(usize, usize)> {
        loop {
            let player = match mark {
                Mark::X => &mut self.player_x,
                Mark::O => &mut self.player_o,
            };
            let (row, col) = player
                .next_move(&self.board)
                .await
                .with_context(|| format!("player {mark} failed to produce a move"))?;

            if self.board.is_valid_move(row, col) {
                return Ok((row, col));
            }

            match player.kind() {
                PlayerKind::Human => {
                    warn!(%mark, row, col, "Discarding invalid human move, re-requesting");
                }
                PlayerKind::Computer => {
                    bail!(
                        "computer player produced invalid move ({row}, {col}): \
                         engine invariant violated"
                    );
                }
            }
        }
    }

    fn finish(&mut self, outcome: Outcome) -> Result<Outcome> {
        info!(?outcome, moves = self.move_counter, "Game over");
        for observer in &mut self.observers {
            observer.game_ended(&self.board, outcome)?;
        }
        Ok(outcome)
    }

    fn current_player_name(&self) -> &str {
        match self.to_move {
            Mark::X => self.player_x.name(),
            Mark::O => self.player_o.name(),
        }
    }
}
