//! Line-oriented console presentation.

use anyhow::Result;
use crossterm::style::Stylize;

use crate::board::{Board, Cell, Mark};
use crate::session::{Outcome, PlacedMove, SessionObserver};

/// Display surface the engine and replay write to.
pub trait Presenter {
    /// Draws the full board.
    fn render_board(&mut self, board: &Board);

    /// Shows a one-line status message.
    fn update_status(&mut self, message: &str);
}

/// Presenter printing an ASCII grid to stdout, marks colored per side.
#[derive(Debug, Default)]
pub struct ConsoleView;

impl ConsoleView {
    /// Creates a console view.
    pub fn new() -> Self {
        Self
    }
}

impl Presenter for ConsoleView {
    fn render_board(&mut self, board: &Board) {
        let rule = "-".repeat(board.size() * 4 + 1);
        println!("{rule}");
        for row in 0..board.size() {
            let mut line = String::from("|");
            for col in 0..board.size() {
                match board.get(row, col) {
                    Some(Cell::Occupied(Mark::X)) => {
                        line.push_str(&format!(" {} |", "X".red()));
                    }
                    Some(Cell::Occupied(Mark::O)) => {
                        line.push_str(&format!(" {} |", "O".blue()));
                    }
                    _ => line.push_str("   |"),
                }
            }
            println!("{line}");
            println!("{rule}");
        }
    }

    fn update_status(&mut self, message: &str) {
        println!("{message}");
    }
}

impl SessionObserver for ConsoleView {
    fn turn_started(&mut self, board: &Board, mark: Mark, name: &str) -> Result<()> {
        self.render_board(board);
        self.update_status(&format!("Current player: {mark} ({name})"));
        Ok(())
    }

    fn move_applied(&mut self, _board: &Board, _mv: &PlacedMove) -> Result<()> {
        // The board is drawn at the start of the next turn, or below on the
        // final move.
        Ok(())
    }

    fn game_ended(&mut self, board: &Board, outcome: Outcome) -> Result<()> {
        self.render_board(board);
        match outcome {
            Outcome::Won(mark) => self.update_status(&format!("Player {mark} wins!")),
            Outcome::Draw => self.update_status("It's a draw!"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_handles_all_supported_sizes() {
        let mut view = ConsoleView::new();
        for size in [3, 10] {
            let mut board = Board::new(size).unwrap();
            board.place(0, 0, Mark::X).unwrap();
            board.place(size - 1, size - 1, Mark::O).unwrap();
            view.render_board(&board);
        }
    }
}
