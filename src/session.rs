use std::time::Duration;

use tracing::{debug, info, warn};

use crate::board::{square_name, Board, Color, Piece};
use crate::config::Config;
use crate::error::{ChessError, Result};
use crate::game::{GameState, GameStatus, MoveOutcome, Outcome};
use crate::movegen::Move;
use crate::opponent::Opponent;

/// The player always has the white pieces.
pub const HUMAN: Color = Color::White;
pub const PET: Color = Color::Black;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Not the player's turn, input locked, or a click on nothing useful.
    Ignored,
    Selected(u8),
    Deselected,
    Moved(MoveOutcome),
}

/// What a rendering layer talks to.
///
/// Clicks and promotion choices come in, board snapshots, move hints and a
/// status line go out. After the player's move completes the pet's reply is
/// due; the front end waits [`ChessSession::opponent_delay`] and then calls
/// [`ChessSession::play_opponent_move`]. Player input is ignored meanwhile.
pub struct ChessSession {
    state: GameState,
    opponent: Opponent,
    pet_name: String,
    opponent_delay: Duration,
    opponent_pending: bool,
}

impl ChessSession {
    pub fn new(config: &Config) -> Self {
        Self::with_state(config, GameState::new())
    }

    pub fn with_state(config: &Config, state: GameState) -> Self {
        let opponent = match config.seed {
            Some(seed) => Opponent::with_seed(seed),
            None => Opponent::new(),
        };
        let mut session = Self {
            state,
            opponent,
            pet_name: config.pet_name.clone(),
            opponent_delay: Duration::from_millis(config.opponent_delay_ms),
            opponent_pending: false,
        };
        session.schedule_opponent();
        session
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn selection(&self) -> Option<u8> {
        self.state.selection
    }

    pub fn pet_name(&self) -> &str {
        &self.pet_name
    }

    pub fn opponent_delay(&self) -> Duration {
        self.opponent_delay
    }

    /// True while the pet's reply is scheduled but not yet played.
    pub fn opponent_pending(&self) -> bool {
        self.opponent_pending
    }

    fn accepts_player_input(&self) -> bool {
        !self.state.locked && !self.opponent_pending && self.state.side_to_move() == Some(HUMAN)
    }

    fn schedule_opponent(&mut self) {
        self.opponent_pending = self.state.side_to_move() == Some(PET) && !self.state.locked;
    }

    /// Legal destinations of the player's piece on `square`, in square order,
    /// for highlighting.
    pub fn legal_destinations(&self, square: u8) -> Vec<u8> {
        if square >= 64 || !self.state.board.is_color(square, HUMAN) {
            return Vec::new();
        }
        let mut destinations = self.state.legal_moves(square);
        destinations.sort_unstable();
        destinations
    }

    pub fn on_square_selected(&mut self, square: u8) -> SelectionOutcome {
        if square >= 64 || !self.accepts_player_input() {
            debug!("ignoring click on {}", square_name(square));
            return SelectionOutcome::Ignored;
        }
        let own_piece = self.state.board.is_color(square, HUMAN);

        let selected = match self.state.selection {
            None if own_piece => {
                self.state.selection = Some(square);
                return SelectionOutcome::Selected(square);
            }
            None => return SelectionOutcome::Ignored,
            Some(selected) if selected == square => {
                self.state.selection = None;
                return SelectionOutcome::Deselected;
            }
            Some(selected) => selected,
        };

        if !self.state.legal_moves(selected).contains(&square) {
            if own_piece {
                self.state.selection = Some(square);
                return SelectionOutcome::Selected(square);
            }
            return SelectionOutcome::Ignored;
        }

        self.state.selection = None;
        match self.state.apply_move(selected, square, None) {
            Ok(outcome) => {
                self.schedule_opponent();
                SelectionOutcome::Moved(outcome)
            }
            Err(e) => {
                warn!(
                    "rejected player move {} -> {}: {}",
                    square_name(selected),
                    square_name(square),
                    e
                );
                SelectionOutcome::Ignored
            }
        }
    }

    /// Resolves the player's pending promotion. Errors when nothing is pending.
    pub fn on_promotion_choice(&mut self, kind: Piece) -> Result<GameStatus> {
        if self.state.pending_promotion.is_none() {
            warn!("promotion choice {} with no promotion pending", kind);
            return Err(ChessError::NoPendingPromotion);
        }
        let status = self.state.resolve_promotion(kind)?;
        self.schedule_opponent();
        Ok(status)
    }

    pub fn on_new_game(&mut self) {
        info!("new game");
        self.state = GameState::new();
        self.opponent_pending = false;
    }

    /// Plays the pet's scheduled reply. The pet always promotes to a queen.
    pub fn play_opponent_move(&mut self) -> Option<Move> {
        if !self.opponent_pending {
            return None;
        }
        self.opponent_pending = false;

        let chosen = self.opponent.choose_move(&self.state)?;
        match self.state.apply_move(chosen.from, chosen.to, Some(Piece::Queen)) {
            Ok(MoveOutcome::Played { mv, .. }) => Some(mv),
            Ok(MoveOutcome::AwaitingPromotion { .. }) => {
                warn!("pet move left a promotion pending");
                None
            }
            Err(e) => {
                warn!("pet chose an illegal move: {}", e);
                None
            }
        }
    }

    pub fn status_text(&self) -> String {
        let pet = &self.pet_name;
        match self.state.status() {
            GameStatus::Over(Outcome::Checkmate { winner }) if winner == HUMAN => {
                format!("{} is checkmated. You win!", pet)
            }
            GameStatus::Over(Outcome::Checkmate { .. }) => format!("Checkmate! {} wins!", pet),
            GameStatus::Over(Outcome::Stalemate) => "Stalemate. It's a draw.".to_string(),
            GameStatus::Over(Outcome::KingCaptured { winner }) if winner == HUMAN => {
                format!("Checkmate (capture)! {} resigns. You win!", pet)
            }
            GameStatus::Over(Outcome::KingCaptured { .. }) => {
                format!("Checkmate (capture)! {} wins!", pet)
            }
            GameStatus::AwaitingPromotion(_) => {
                "Choose a piece for your pawn (queen, rook, bishop, knight)".to_string()
            }
            GameStatus::InCheck(side) if side == PET => format!("{} is in check!", pet),
            GameStatus::ToMove(side) if side == PET => format!("{} is thinking…", pet),
            GameStatus::InCheck(_) => "You are in check!".to_string(),
            GameStatus::ToMove(_) => format!("Your turn ({})", HUMAN),
        }
    }
}
