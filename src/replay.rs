//! Deterministic reconstruction of stored games, move by move.

use std::time::Duration;

use derive_more::{Display, Error, From};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, instrument};

use crate::board::{Board, BoardError, Mark};
use crate::console::Presenter;
use crate::db::GameOutcome;

/// One move as read back from storage, coordinates 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedMove {
    /// Mark that was placed.
    pub mark: Mark,
    /// Row of the placed mark.
    pub row: usize,
    /// Column of the placed mark.
    pub col: usize,
    /// 1-based ordinal within the game.
    pub sequence: u32,
}

/// Errors from replaying a stored game.
///
/// All of these are fatal to the replay attempt only; the persisted record
/// is never modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum ReplayError {
    /// The stored game has no moves to replay.
    #[display("cannot replay a game with no recorded moves")]
    EmptyReplay,
    /// Sequence numbers are not contiguous starting at 1.
    #[display("corrupted move log: expected sequence {expected}, found {found}")]
    SequenceGap {
        /// Sequence number the log should contain next.
        expected: u32,
        /// Sequence number actually found.
        found: u32,
    },
    /// A stored move is not playable on the reconstructed board.
    #[display("corrupted move log: move {sequence} at ({row}, {col}) is not playable")]
    InvalidMove {
        /// Sequence number of the offending move.
        sequence: u32,
        /// Row of the offending move.
        row: usize,
        /// Column of the offending move.
        col: usize,
    },
    /// The stored board size is outside the supported range.
    #[display("{_0}")]
    #[from]
    Board(BoardError),
}

/// A board snapshot after applying one stored move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayFrame {
    /// The move that produced this snapshot.
    pub mv: RecordedMove,
    /// Board state after the move.
    pub board: Board,
}

/// Lazy reconstruction of a stored game.
///
/// Applies moves in stored order to a fresh scratch board and yields one
/// [`ReplayFrame`] per move. Constructing a second `Replay` from the same
/// record yields identical frames; nothing about the live session, players
/// or persistence layer is touched.
///
/// After the iterator is exhausted the caller reports [`Replay::outcome`],
/// which is the *stored* outcome. Replay never recomputes the result from
/// the final board; a disagreement between the two is a data integrity
/// concern for other tooling, not for this engine.
#[derive(Debug)]
pub struct Replay {
    board: Board,
    moves: Vec<RecordedMove>,
    outcome: GameOutcome,
    cursor: usize,
    poisoned: bool,
}

impl Replay {
    /// Prepares a replay of `moves` on a fresh board of `board_size`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::EmptyReplay`] for an empty move list and
    /// [`ReplayError::Board`] for an unsupported stored board size.
    pub fn new(
        board_size: usize,
        moves: Vec<RecordedMove>,
        outcome: GameOutcome,
    ) -> Result<Self, ReplayError> {
        if moves.is_empty() {
            return Err(ReplayError::EmptyReplay);
        }
        Ok(Self {
            board: Board::new(board_size)?,
            moves,
            outcome,
            cursor: 0,
            poisoned: false,
        })
    }

    /// The outcome stored with the game record.
    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    /// Total number of frames this replay will yield if the log is intact.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// True iff no frames would be yielded. Always false for a constructed
    /// replay; kept for iterator-convention completeness.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl Iterator for Replay {
    type Item = Result<ReplayFrame, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }
        let mv = *self.moves.get(self.cursor)?;
        self.cursor += 1;

        let expected = self.cursor as u32;
        if mv.sequence != expected {
            self.poisoned = true;
            return Some(Err(ReplayError::SequenceGap {
                expected,
                found: mv.sequence,
            }));
        }

        if self.board.place(mv.row, mv.col, mv.mark).is_err() {
            self.poisoned = true;
            return Some(Err(ReplayError::InvalidMove {
                sequence: mv.sequence,
                row: mv.row,
                col: mv.col,
            }));
        }

        Some(Ok(ReplayFrame {
            mv,
            board: self.board.clone(),
        }))
    }
}

/// How a playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Every frame was shown; carries the stored outcome.
    Completed(GameOutcome),
    /// Playback was cancelled between frames.
    Interrupted {
        /// Frames shown before the cancellation took effect.
        frames_shown: usize,
    },
}

/// Steps through a replay on a presenter, pausing `delay` between frames.
///
/// The `stop` channel cancels playback: it is checked before each frame and
/// again after each inter-frame delay, so a cancellation that lands during
/// the pause stops the very next frame from rendering.
///
/// # Errors
///
/// Propagates [`ReplayError`] from a corrupted move log.
#[instrument(skip_all, fields(frames = replay.len(), delay = ?delay))]
pub async fn play_back(
    mut replay: Replay,
    presenter: &mut impl Presenter,
    delay: Duration,
    stop: &mut watch::Receiver<bool>,
) -> Result<PlaybackStatus, ReplayError> {
    let total = replay.len();
    let mut frames_shown = 0;

    while let Some(frame) = replay.next() {
        let frame = frame?;
        if *stop.borrow() {
            info!(frames_shown, "Playback interrupted");
            return Ok(PlaybackStatus::Interrupted { frames_shown });
        }

        presenter.update_status(&format!(
            "Move {}: {} plays ({}, {})",
            frame.mv.sequence,
            frame.mv.mark,
            frame.mv.row + 1,
            frame.mv.col + 1
        ));
        presenter.render_board(&frame.board);
        frames_shown += 1;

        if frames_shown < total && !delay.is_zero() {
            tokio::select! {
                _ = sleep(delay) => {}
                _ = cancelled(stop) => {}
            }
            if *stop.borrow() {
                info!(frames_shown, "Playback interrupted");
                return Ok(PlaybackStatus::Interrupted { frames_shown });
            }
        }
    }

    info!(frames_shown, "Playback complete");
    Ok(PlaybackStatus::Completed(replay.outcome()))
}

/// Resolves when the stop channel flips to `true`.
///
/// A dropped sender means cancellation can no longer arrive, so this pends
/// forever and lets the delay branch win.
async fn cancelled(stop: &mut watch::Receiver<bool>) {
    while stop.changed().await.is_ok() {
        if *stop.borrow() {
            return;
        }
    }
    std::future::pending::<()>().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(sequence: u32, mark: Mark, row: usize, col: usize) -> RecordedMove {
        RecordedMove {
            mark,
            row,
            col,
            sequence,
        }
    }

    /// The §8-style diagonal game: X(0,0) O(0,1) X(1,1) O(0,2) X(2,2).
    fn diagonal_game() -> Vec<RecordedMove> {
        vec![
            mv(1, Mark::X, 0, 0),
            mv(2, Mark::O, 0, 1),
            mv(3, Mark::X, 1, 1),
            mv(4, Mark::O, 0, 2),
            mv(5, Mark::X, 2, 2),
        ]
    }

    struct NullPresenter {
        statuses: Vec<String>,
        boards: usize,
    }

    impl NullPresenter {
        fn new() -> Self {
            Self {
                statuses: Vec::new(),
                boards: 0,
            }
        }
    }

    impl Presenter for NullPresenter {
        fn render_board(&mut self, _board: &Board) {
            self.boards += 1;
        }

        fn update_status(&mut self, message: &str) {
            self.statuses.push(message.to_string());
        }
    }

    #[test]
    fn test_empty_move_list_is_rejected() {
        assert_eq!(
            Replay::new(3, Vec::new(), GameOutcome::Draw).unwrap_err(),
            ReplayError::EmptyReplay
        );
    }

    #[test]
    fn test_stored_size_is_validated() {
        let result = Replay::new(2, diagonal_game(), GameOutcome::Won(Mark::X));
        assert!(matches!(result, Err(ReplayError::Board(_))));
    }

    #[test]
    fn test_yields_one_frame_per_move_and_matches_direct_application() {
        let moves = diagonal_game();
        let replay = Replay::new(3, moves.clone(), GameOutcome::Won(Mark::X)).unwrap();
        let frames: Vec<_> = replay.map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), moves.len());

        let mut direct = Board::new(3).unwrap();
        for m in &moves {
            direct.place(m.row, m.col, m.mark).unwrap();
        }
        assert_eq!(frames.last().unwrap().board, direct);
        assert!(frames.last().unwrap().board.check_win(Mark::X));
    }

    #[test]
    fn test_replay_is_restartable() {
        let first: Vec<_> = Replay::new(3, diagonal_game(), GameOutcome::Won(Mark::X))
            .unwrap()
            .map(|f| f.unwrap())
            .collect();
        let second: Vec<_> = Replay::new(3, diagonal_game(), GameOutcome::Won(Mark::X))
            .unwrap()
            .map(|f| f.unwrap())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sequence_gap_is_detected() {
        let moves = vec![mv(1, Mark::X, 0, 0), mv(3, Mark::O, 0, 1)];
        let mut replay = Replay::new(3, moves, GameOutcome::Undetermined).unwrap();
        assert!(replay.next().unwrap().is_ok());
        assert_eq!(
            replay.next().unwrap().unwrap_err(),
            ReplayError::SequenceGap {
                expected: 2,
                found: 3
            }
        );
        // Poisoned after the first corruption.
        assert!(replay.next().is_none());
    }

    #[test]
    fn test_conflicting_stored_move_is_detected() {
        let moves = vec![mv(1, Mark::X, 0, 0), mv(2, Mark::O, 0, 0)];
        let mut replay = Replay::new(3, moves, GameOutcome::Undetermined).unwrap();
        assert!(replay.next().unwrap().is_ok());
        assert_eq!(
            replay.next().unwrap().unwrap_err(),
            ReplayError::InvalidMove {
                sequence: 2,
                row: 0,
                col: 0
            }
        );
    }

    #[tokio::test]
    async fn test_playback_reports_stored_outcome() {
        // Stored outcome wins over whatever the final board implies.
        let replay = Replay::new(3, diagonal_game(), GameOutcome::Draw).unwrap();
        let mut presenter = NullPresenter::new();
        let (_tx, mut rx) = watch::channel(false);

        let status = play_back(replay, &mut presenter, Duration::ZERO, &mut rx)
            .await
            .unwrap();
        assert_eq!(status, PlaybackStatus::Completed(GameOutcome::Draw));
        assert_eq!(presenter.boards, 5);
        assert_eq!(presenter.statuses.len(), 5);
        assert!(presenter.statuses[0].contains("Move 1"));
    }

    #[tokio::test]
    async fn test_playback_cancelled_before_first_frame() {
        let replay = Replay::new(3, diagonal_game(), GameOutcome::Won(Mark::X)).unwrap();
        let mut presenter = NullPresenter::new();
        let (tx, mut rx) = watch::channel(false);
        tx.send(true).unwrap();

        let status = play_back(replay, &mut presenter, Duration::ZERO, &mut rx)
            .await
            .unwrap();
        assert_eq!(status, PlaybackStatus::Interrupted { frames_shown: 0 });
        assert_eq!(presenter.boards, 0);
    }

    #[tokio::test]
    async fn test_playback_cancelled_during_delay() {
        let replay = Replay::new(3, diagonal_game(), GameOutcome::Won(Mark::X)).unwrap();
        let mut presenter = NullPresenter::new();
        let (tx, mut rx) = watch::channel(false);

        // Cancel while the first inter-frame pause is in flight.
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tx.send(true).unwrap();
            tx
        });

        let status = play_back(replay, &mut presenter, Duration::from_secs(60), &mut rx)
            .await
            .unwrap();
        assert_eq!(status, PlaybackStatus::Interrupted { frames_shown: 1 });
        drop(handle.await.unwrap());
    }

    #[tokio::test]
    async fn test_playback_propagates_corruption() {
        let moves = vec![mv(1, Mark::X, 0, 0), mv(2, Mark::O, 0, 0)];
        let replay = Replay::new(3, moves, GameOutcome::Undetermined).unwrap();
        let mut presenter = NullPresenter::new();
        let (_tx, mut rx) = watch::channel(false);

        let err = play_back(replay, &mut presenter, Duration::ZERO, &mut rx)
            .await
            .unwrap_err();
        assert!(matches!(err, ReplayError::InvalidMove { sequence: 2, .. }));
    }
}
