//! Noughts - command-line entry point.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use noughts::{
    assign_marks, play_back, Board, Cli, Command, ComputerPlayer, ConsoleView, GameRecorder,
    GameRepository, GameSession, HumanPlayer, Mark, PlaybackStatus, Replay,
};

/// Pause before each computer move, for perceived thinking.
const THINK_DELAY: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let db_path = cli
        .db_path
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "noughts.db".to_string());

    let repository = GameRepository::new(db_path)?;
    repository.run_migrations()?;

    match cli.command {
        Command::New {
            board_size,
            player_name,
        } => run_new_game(repository, board_size, player_name).await,
        Command::List => run_list_games(&repository),
        Command::Replay { game_id, delay_ms } => run_replay(&repository, game_id, delay_ms).await,
    }
}

/// Plays one game against the computer and records it.
async fn run_new_game(
    repository: GameRepository,
    board_size: usize,
    player_name: String,
) -> Result<()> {
    // Reject a bad size before anything is persisted.
    let board = Board::new(board_size).context("cannot start a game")?;

    let mut rng = StdRng::from_entropy();
    let (human_mark, computer_mark) = assign_marks(&mut rng);
    println!("You play as {human_mark}. X always moves first.");

    let (x_name, o_name) = match human_mark {
        Mark::X => (player_name.as_str(), "Computer"),
        Mark::O => ("Computer", player_name.as_str()),
    };
    let recorder = GameRecorder::create(repository, board_size, x_name, o_name)?;
    let game_id = recorder.game_id();

    let human = HumanPlayer::new(
        player_name.clone(),
        human_mark,
        BufReader::new(tokio::io::stdin()),
    );
    let computer = ComputerPlayer::new("Computer", computer_mark, StdRng::from_entropy())
        .with_think_delay(THINK_DELAY);

    let mut session = GameSession::new(board, Box::new(human), Box::new(computer))?;
    session.subscribe(Box::new(ConsoleView::new()));
    session.subscribe(Box::new(recorder));

    let outcome = session.run().await?;
    info!(game_id, ?outcome, "Session complete");
    println!("Game #{game_id} saved.");
    Ok(())
}

/// Prints all saved games, newest first.
fn run_list_games(repository: &GameRepository) -> Result<()> {
    let games = repository.list_games()?;
    if games.is_empty() {
        println!("No saved games.");
        return Ok(());
    }

    println!(
        "{:<5} {:<7} {:<18} {:<18} {:<12} {}",
        "id", "size", "player X", "player O", "outcome", "started"
    );
    for game in games {
        let outcome = game.outcome()?;
        println!(
            "{:<5} {:<7} {:<18} {:<18} {:<12} {}",
            game.id(),
            format!("{0}x{0}", game.board_size()),
            game.player_x_name(),
            game.player_o_name(),
            outcome.to_string(),
            game.started_at().format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

/// Replays a saved game move by move; Ctrl-C interrupts between frames.
async fn run_replay(repository: &GameRepository, game_id: i32, delay_ms: u64) -> Result<()> {
    let game = repository
        .get_game(game_id)?
        .with_context(|| format!("game {game_id} not found"))?;
    let size = usize::try_from(*game.board_size()).context("stored board size is invalid")?;

    let moves = repository
        .get_moves(game_id)?
        .iter()
        .map(|m| m.to_recorded())
        .collect::<Result<Vec<_>, _>>()?;
    let replay = Replay::new(size, moves, game.outcome()?)?;

    println!(
        "Replaying game #{game_id} ({size}x{size}): {} vs {}",
        game.player_x_name(),
        game.player_o_name()
    );

    let (stop_tx, mut stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    let mut view = ConsoleView::new();
    let status = play_back(replay, &mut view, Duration::from_millis(delay_ms), &mut stop_rx).await?;
    match status {
        PlaybackStatus::Completed(outcome) => println!("Result: {outcome}."),
        PlaybackStatus::Interrupted { frames_shown } => {
            println!("Replay interrupted after {frames_shown} moves.");
        }
    }
    Ok(())
}
