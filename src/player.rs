//! Player abstraction: a prompt-driven human and a random computer opponent.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use derive_more::{Display, Error, From};
use rand::seq::SliceRandom;
use rand::Rng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

use crate::board::{Board, Mark};

/// Errors from obtaining a move.
#[derive(Debug, Display, Error, From)]
pub enum PlayerError {
    /// The board has no open cell to choose from.
    ///
    /// The turn engine checks for a full board before requesting a move, so
    /// hitting this signals an engine invariant violation rather than a
    /// normal game condition.
    #[display("no moves available: the board has no open cells")]
    NoMovesAvailable,
    /// The human input stream ended before a move was supplied.
    #[display("input stream closed before a move was supplied")]
    InputClosed,
    /// Reading human input failed.
    #[display("failed to read input: {_0}")]
    #[from]
    Input(std::io::Error),
}

/// What kind of move source a player is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    /// Moves come from an external actor and may be re-requested.
    Human,
    /// Moves are self-determined; an invalid one is an engine bug.
    Computer,
}

/// A source of moves for one mark.
#[async_trait]
pub trait Player: Send {
    /// Produces the next move for this player given the current board.
    async fn next_move(&mut self, board: &Board) -> Result<(usize, usize), PlayerError>;

    /// The mark this player places.
    fn mark(&self) -> Mark;

    /// The player's display name.
    fn name(&self) -> &str;

    /// Whether this player is an external or self-determined move source.
    fn kind(&self) -> PlayerKind;
}

/// Flips a fair coin for the human's mark; the computer takes the other.
///
/// Returns `(human_mark, computer_mark)`. The assignment is fixed for the
/// session's lifetime.
pub fn assign_marks(rng: &mut impl Rng) -> (Mark, Mark) {
    let human = if rng.gen_bool(0.5) { Mark::X } else { Mark::O };
    (human, human.opponent())
}

/// Human player reading `row,col` moves from a line-oriented input source.
///
/// Coordinates are 1-based on the wire. Malformed lines and moves that fail
/// [`Board::is_valid_move`] are reported and re-prompted, so a returned move
/// is always legal on the board it was requested for.
pub struct HumanPlayer<R> {
    name: String,
    mark: Mark,
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> HumanPlayer<R> {
    /// Creates a human player reading moves from `reader`.
    pub fn new(name: impl Into<String>, mark: Mark, reader: R) -> Self {
        Self {
            name: name.into(),
            mark,
            lines: reader.lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Player for HumanPlayer<R> {
    async fn next_move(&mut self, board: &Board) -> Result<(usize, usize), PlayerError> {
        loop {
            print!("{} ({}), enter your move as row,col (e.g. 1,1): ", self.name, self.mark);
            std::io::stdout().flush()?;

            let line = self
                .lines
                .next_line()
                .await?
                .ok_or(PlayerError::InputClosed)?;

            match parse_coordinates(&line) {
                Some((row, col)) if board.is_valid_move(row, col) => {
                    debug!(player = %self.name, row, col, "Human chose move");
                    return Ok((row, col));
                }
                Some((row, col)) => {
                    debug!(player = %self.name, row, col, "Rejected illegal human move");
                    println!("That cell is occupied or off the board. Try again.");
                }
                None => {
                    println!("Could not read that. Use row,col with 1-based coordinates.");
                }
            }
        }
    }

    fn mark(&self) -> Mark {
        self.mark
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Human
    }
}

/// Parses a 1-based `row,col` pair into 0-based coordinates.
fn parse_coordinates(input: &str) -> Option<(usize, usize)> {
    let (row, col) = input.trim().split_once(',')?;
    let row: usize = row.trim().parse().ok()?;
    let col: usize = col.trim().parse().ok()?;
    Some((row.checked_sub(1)?, col.checked_sub(1)?))
}

/// Computer player choosing uniformly at random among open cells.
///
/// The generator is injected so tests can supply a seeded one.
pub struct ComputerPlayer<R> {
    name: String,
    mark: Mark,
    rng: R,
    think_delay: Duration,
}

impl<R: Rng + Send> ComputerPlayer<R> {
    /// Creates a computer player with no thinking delay.
    pub fn new(name: impl Into<String>, mark: Mark, rng: R) -> Self {
        Self {
            name: name.into(),
            mark,
            rng,
            think_delay: Duration::ZERO,
        }
    }

    /// Adds an artificial pause before each move, for perceived thinking.
    pub fn with_think_delay(mut self, delay: Duration) -> Self {
        self.think_delay = delay;
        self
    }
}

#[async_trait]
impl<R: Rng + Send> Player for ComputerPlayer<R> {
    async fn next_move(&mut self, board: &Board) -> Result<(usize, usize), PlayerError> {
        if !self.think_delay.is_zero() {
            tokio::time::sleep(self.think_delay).await;
        }

        let open = board.open_cells();
        let choice = open
            .choose(&mut self.rng)
            .copied()
            .ok_or(PlayerError::NoMovesAvailable)?;

        debug!(player = %self.name, row = choice.0, col = choice.1, "Computer chose move");
        Ok(choice)
    }

    fn mark(&self) -> Mark {
        self.mark
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Computer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::io::BufReader;

    fn human(input: &'static [u8], mark: Mark) -> HumanPlayer<BufReader<&'static [u8]>> {
        HumanPlayer::new("Tester", mark, BufReader::new(input))
    }

    #[tokio::test]
    async fn test_human_accepts_legal_move() {
        let board = Board::new(3).unwrap();
        let mut player = human(b"1,1\n", Mark::X);
        assert_eq!(player.next_move(&board).await.unwrap(), (0, 0));
    }

    #[tokio::test]
    async fn test_human_reprompts_until_legal() {
        let mut board = Board::new(3).unwrap();
        board.place(0, 0, Mark::O).unwrap();
        // "1,1" is occupied, "0,0" and "nonsense" are malformed (1-based wire
        // format), "4,4" is off the board, "2,3" finally lands.
        let mut player = human(b"1,1\n0,0\nnonsense\n4,4\n2,3\n", Mark::X);
        assert_eq!(player.next_move(&board).await.unwrap(), (1, 2));
    }

    #[tokio::test]
    async fn test_human_input_closed() {
        let board = Board::new(3).unwrap();
        let mut player = human(b"", Mark::X);
        assert!(matches!(
            player.next_move(&board).await,
            Err(PlayerError::InputClosed)
        ));
    }

    #[tokio::test]
    async fn test_computer_takes_last_open_cell() {
        let mut board = Board::new(3).unwrap();
        for (row, col) in [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0), (2, 1)] {
            board.place(row, col, Mark::X).unwrap();
        }
        let mut player = ComputerPlayer::new("Computer", Mark::O, StdRng::seed_from_u64(7));
        assert_eq!(player.next_move(&board).await.unwrap(), (2, 2));
    }

    #[tokio::test]
    async fn test_computer_full_board_is_engine_violation() {
        let mut board = Board::new(3).unwrap();
        for (row, col) in board.open_cells() {
            board.place(row, col, Mark::X).unwrap();
        }
        let mut player = ComputerPlayer::new("Computer", Mark::O, StdRng::seed_from_u64(7));
        assert!(matches!(
            player.next_move(&board).await,
            Err(PlayerError::NoMovesAvailable)
        ));
    }

    #[tokio::test]
    async fn test_computer_moves_are_always_legal() {
        let mut board = Board::new(5).unwrap();
        board.place(2, 2, Mark::X).unwrap();
        board.place(0, 4, Mark::X).unwrap();

        for seed in 0..20 {
            let mut player = ComputerPlayer::new("Computer", Mark::O, StdRng::seed_from_u64(seed));
            let (row, col) = player.next_move(&board).await.unwrap();
            assert!(board.is_valid_move(row, col), "seed {seed} chose ({row}, {col})");
        }
    }

    #[test]
    fn test_assign_marks_covers_both_outcomes() {
        let mut saw_x = false;
        let mut saw_o = false;
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (human, computer) = assign_marks(&mut rng);
            assert_eq!(computer, human.opponent());
            match human {
                Mark::X => saw_x = true,
                Mark::O => saw_o = true,
            }
        }
        assert!(saw_x && saw_o, "coin flip never produced one of the marks");
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(parse_coordinates(" 2 , 3 "), Some((1, 2)));
        assert_eq!(parse_coordinates("0,1"), None);
        assert_eq!(parse_coordinates("1"), None);
        assert_eq!(parse_coordinates("a,b"), None);
    }
}
