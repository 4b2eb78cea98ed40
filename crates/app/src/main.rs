use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use simon_core::{
    AppConfig, BoardEvent, Coordinate, GameState, GridLayout, RecordingBoard, ScreenPoint,
    SimonGame, TapOutcome,
};
use tracing_subscriber::EnvFilter;

fn main() -> simon_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config,
            seed,
            realtime,
        } => run_play(&load_config(config.as_deref(), seed)?, realtime),
        Commands::Simulate {
            config,
            seed,
            rounds,
        } => run_simulate(&load_config(config.as_deref(), seed)?, rounds),
        Commands::Config => {
            println!("{}", AppConfig::default_json()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> simon_core::Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load_or_default(path)?,
        None => AppConfig::default(),
    };
    if seed.is_some() {
        config.pattern.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn layout_for(config: &AppConfig) -> GridLayout {
    GridLayout::new(config.board.size(), 1.0, 1.0)
}

fn run_play(config: &AppConfig, realtime: bool) -> simon_core::Result<()> {
    tracing::info!(seed = ?config.pattern.seed, realtime, "starting interactive game");

    let layout = layout_for(config);
    let mut game = SimonGame::new(config, RecordingBoard::new(layout))?;
    println!(
        "Board is {}x{}. Press enter to start, then type `column row` per tap, `q` to quit.",
        layout.size.columns, layout.size.rows
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line == "q" {
            break;
        }

        let point = match parse_coordinate(line) {
            Some(coordinate) if layout.size.contains(coordinate) => layout.center_of(coordinate),
            _ => ScreenPoint::new(-1.0, -1.0),
        };
        match game.on_tap_down(point)? {
            TapOutcome::NoTile if game.state() == GameState::UserPattern => {
                println!("no tile there; expected `column row`");
            }
            outcome => tracing::debug!(?outcome, "tap handled"),
        }

        settle(&mut game, realtime)?;
        if game.state() == GameState::UserPattern {
            print!("level {} > ", game.level());
            io::stdout().flush()?;
        }
    }

    println!("best level: {}", game.best_level());
    Ok(())
}

fn run_simulate(config: &AppConfig, rounds: usize) -> simon_core::Result<()> {
    tracing::info!(seed = ?config.pattern.seed, rounds, "running simulation");

    let layout = layout_for(config);
    let mut game = SimonGame::new(config, RecordingBoard::new(layout))?;

    game.on_tap_down(layout.center_of(Coordinate::new(0, 0)))?;
    settle(&mut game, false)?;

    for level in 0..rounds {
        let expected = game.pattern().prefix(level)?.to_vec();
        for coordinate in expected {
            game.on_tap_down(layout.center_of(coordinate))?;
            settle(&mut game, false)?;
        }
    }

    let expected = game.pattern().get(game.tiles_tapped())?;
    match layout.size.coordinates().find(|&c| c != expected) {
        Some(wrong) => {
            println!("tapping {wrong} instead of {expected}");
            game.on_tap_down(layout.center_of(wrong))?;
            settle(&mut game, false)?;
        }
        None => println!("single-tile board, every tap is correct"),
    }

    println!(
        "finished at {} ms in state {}, best level {}",
        game.now().as_millis(),
        game.state(),
        game.best_level()
    );
    Ok(())
}

/// Runs the clock forward until the game waits for the player, printing what
/// the board and state machine do along the way.
fn settle(game: &mut SimonGame<RecordingBoard>, realtime: bool) -> simon_core::Result<()> {
    report(game);
    while !game.awaits_input() {
        let Some(deadline) = game.next_deadline() else {
            break;
        };
        if realtime {
            std::thread::sleep(deadline.saturating_sub(game.now()));
        }
        game.on_tick(deadline)?;
        report(game);
    }
    Ok(())
}

fn report(game: &mut SimonGame<RecordingBoard>) {
    let at = game.now();
    for change in game.take_transitions() {
        println!("{:>7} ms  {} -> {}", change.at.as_millis(), change.from, change.to);
    }
    for event in game.board_mut().take_events() {
        match event {
            BoardEvent::Pressed(c) => println!("{:>7} ms  [{c}] on", at.as_millis()),
            BoardEvent::Released(c) => println!("{:>7} ms  [{c}] off", at.as_millis()),
            BoardEvent::Tone(_) => {}
        }
    }
}

fn parse_coordinate(line: &str) -> Option<Coordinate> {
    let mut parts = line.split_whitespace();
    let column = parts.next()?.parse().ok()?;
    let row = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Coordinate::new(column, row))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Simon-style memory game", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play in the terminal, typing one `column row` pair per tap.
    Play {
        /// JSON config file; defaults are used when it is missing.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Fixed pattern seed.
        #[arg(short, long)]
        seed: Option<u64>,
        /// Wait in real time between animation steps.
        #[arg(long)]
        realtime: bool,
    },
    /// Let an autoplayer clear a number of rounds and then miss.
    Simulate {
        /// JSON config file; defaults are used when it is missing.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Fixed pattern seed.
        #[arg(short, long)]
        seed: Option<u64>,
        /// Rounds to clear before the deliberate mistake.
        #[arg(short, long, default_value_t = 3)]
        rounds: usize,
    },
    /// Print the default configuration as JSON.
    Config,
}
