use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pawsitive_chess::cli::Cli;
use pawsitive_chess::config::Config;
use pawsitive_chess::terminal::TerminalHandler;
use pawsitive_chess::{logging, ChessSession, GameState};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.apply_to(&mut config);
    logging::init(&config.log_level)?;

    let state = match &cli.fen {
        Some(fen) => GameState::from_fen(fen).context("Could not start from the given FEN")?,
        None => GameState::new(),
    };
    info!("starting game against {}", config.pet_name);

    let mut terminal = TerminalHandler::new(ChessSession::with_state(&config, state));
    terminal.run()
}
