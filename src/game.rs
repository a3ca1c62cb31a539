use tracing::{debug, info};

use crate::board::{row_of, square_name, Board, Color, Piece};
use crate::error::{ChessError, Result};
use crate::movegen::{Move, MoveGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    /// A king left the board. Only reachable from positions that were set up
    /// by hand, since checkmate is declared before a king can be taken.
    KingCaptured { winner: Color },
}

impl Outcome {
    pub fn winner(&self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } | Outcome::KingCaptured { winner } => Some(*winner),
            Outcome::Stalemate => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    ToMove(Color),
    InCheck(Color),
    AwaitingPromotion(Color),
    Over(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPromotion {
    pub square: u8,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Played { mv: Move, status: GameStatus },
    /// The pawn stands on the farthest rank and the turn is on hold until
    /// [`GameState::resolve_promotion`] supplies the replacement piece.
    AwaitingPromotion { mv: Move, square: u8 },
}

/// The authoritative game: position plus the turn state machine.
///
/// `ToMove(side)` alternates until an `Over` outcome is reached. A pawn
/// reaching the last rank without a promotion choice parks the game in
/// `AwaitingPromotion` with `locked` set; nothing else is accepted until the
/// choice arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub outcome: Option<Outcome>,
    /// Square highlighted by the front end. Never read by the rules.
    pub selection: Option<u8>,
    pub pending_promotion: Option<PendingPromotion>,
    pub locked: bool,
    move_generator: MoveGenerator,
}

impl GameState {
    pub fn new() -> Self {
        Self::from_board(Board::new())
    }

    /// Starts a game from an arbitrary position. Positions that are already
    /// decided (mate, stalemate or a missing king) start out `Over`.
    pub fn from_board(board: Board) -> Self {
        let mut state = Self {
            board,
            outcome: None,
            selection: None,
            pending_promotion: None,
            locked: false,
            move_generator: MoveGenerator::new(),
        };
        state.check_kings();
        state.evaluate_terminal();
        state
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::from_board(Board::from_fen(fen)?))
    }

    /// `None` once the game is over.
    pub fn side_to_move(&self) -> Option<Color> {
        match self.outcome {
            Some(_) => None,
            None => Some(self.board.side_to_move),
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn move_generator(&self) -> &MoveGenerator {
        &self.move_generator
    }

    /// Legal destinations for the piece on `from`, provided it belongs to
    /// the side to move and the game accepts moves.
    pub fn legal_moves(&self, from: u8) -> Vec<u8> {
        match self.side_to_move() {
            Some(side) if !self.locked && from < 64 => {
                self.move_generator.legal_moves(&self.board, from, side)
            }
            _ => Vec::new(),
        }
    }

    pub fn all_legal_moves(&self) -> Vec<Move> {
        match self.side_to_move() {
            Some(side) if !self.locked => self.move_generator.generate_moves(&self.board, side),
            _ => Vec::new(),
        }
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.move_generator.is_king_in_check(&self.board, color)
    }

    pub fn status(&self) -> GameStatus {
        if let Some(outcome) = self.outcome {
            return GameStatus::Over(outcome);
        }
        if let Some(pending) = self.pending_promotion {
            return GameStatus::AwaitingPromotion(pending.color);
        }
        let side = self.board.side_to_move;
        if self.is_in_check(side) {
            GameStatus::InCheck(side)
        } else {
            GameStatus::ToMove(side)
        }
    }

    /// Plays `from -> to` for the side to move.
    ///
    /// The pair must be one of [`GameState::legal_moves`]; anything else is
    /// rejected without touching the state. `promotion` is only consulted
    /// when a pawn reaches the farthest rank: with `None` the game suspends
    /// in `AwaitingPromotion`.
    pub fn apply_move(
        &mut self,
        from: u8,
        to: u8,
        promotion: Option<Piece>,
    ) -> Result<MoveOutcome> {
        if self.is_over() {
            return Err(ChessError::GameOver);
        }
        if self.pending_promotion.is_some() {
            return Err(ChessError::PromotionPending);
        }
        for square in [from, to] {
            if square >= 64 {
                return Err(ChessError::InvalidSquare(square));
            }
        }
        let side = self.board.side_to_move;
        match self.board.get_piece_at(from) {
            Some((_, color)) if color != side => return Err(ChessError::NotYourTurn),
            None => return Err(ChessError::IllegalMove { from, to }),
            _ => {}
        }
        if let Some(kind) = promotion {
            if !kind.is_promotion_choice() {
                return Err(ChessError::InvalidPromotion(kind.to_string()));
            }
        }
        if !self.move_generator.legal_moves(&self.board, from, side).contains(&to) {
            return Err(ChessError::IllegalMove { from, to });
        }

        let mut mv = self
            .move_generator
            .describe_move(&self.board, from, to)
            .ok_or(ChessError::IllegalMove { from, to })?;
        let captured_on_target = self.board.get_piece_at(to);

        // En passant victim sits one row behind the target square
        if let Some(victim) = self.move_generator.en_passant_victim(&self.board, from, to) {
            self.board.set_piece(victim, None);
        }

        self.board.set_piece(to, Some((mv.piece, side)));
        self.board.set_piece(from, None);

        if mv.is_castling {
            let (rook_from, rook_to) = if to > from {
                (side.kingside_rook_home(), from + 1)
            } else {
                (side.queenside_rook_home(), from - 1)
            };
            let rook = self.board.get_piece_at(rook_from);
            self.board.set_piece(rook_to, rook);
            self.board.set_piece(rook_from, None);
        }

        let rights = &mut self.board.castling_rights;
        match mv.piece {
            Piece::King => rights.revoke_all(side),
            Piece::Rook
                if from == side.kingside_rook_home() || from == side.queenside_rook_home() =>
            {
                rights.revoke_corner(from)
            }
            _ => {}
        }
        if let Some((Piece::Rook, color)) = captured_on_target {
            if to == color.kingside_rook_home() || to == color.queenside_rook_home() {
                rights.revoke_corner(to);
            }
        }

        self.board.en_passant_square = None;
        if mv.piece == Piece::Pawn && (row_of(to) as i8 - row_of(from) as i8).abs() == 2 {
            self.board.en_passant_square = Some((from + to) / 2);
        }

        debug!(
            "{} {} {} -> {}{}",
            side,
            mv.piece,
            square_name(from),
            square_name(to),
            match mv.captured_piece {
                Some(captured) => format!(" takes {}", captured),
                None => String::new(),
            }
        );

        if mv.piece == Piece::Pawn && row_of(to) == side.promotion_row() {
            match promotion {
                Some(kind) => {
                    self.board.set_piece(to, Some((kind, side)));
                    mv.promotion = Some(kind);
                }
                None => {
                    debug!("{} pawn on {} awaits a promotion choice", side, square_name(to));
                    self.pending_promotion = Some(PendingPromotion { square: to, color: side });
                    self.locked = true;
                    return Ok(MoveOutcome::AwaitingPromotion { mv, square: to });
                }
            }
        }

        let status = self.finish_turn();
        Ok(MoveOutcome::Played { mv, status })
    }

    /// Replaces the waiting pawn with `kind` and hands the turn over.
    pub fn resolve_promotion(&mut self, kind: Piece) -> Result<GameStatus> {
        let pending = self.pending_promotion.ok_or(ChessError::NoPendingPromotion)?;
        if !kind.is_promotion_choice() {
            return Err(ChessError::InvalidPromotion(kind.to_string()));
        }
        debug!("{} pawn on {} promotes to {}", pending.color, square_name(pending.square), kind);
        self.board.set_piece(pending.square, Some((kind, pending.color)));
        self.pending_promotion = None;
        self.locked = false;
        Ok(self.finish_turn())
    }

    fn finish_turn(&mut self) -> GameStatus {
        self.board.side_to_move = self.board.side_to_move.opposite();
        self.check_kings();
        self.evaluate_terminal()
    }

    fn check_kings(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        for color in [Color::White, Color::Black] {
            if self.board.king_square(color).is_none() {
                let outcome = Outcome::KingCaptured { winner: color.opposite() };
                info!("{} king is gone, game over: {:?}", color, outcome);
                self.outcome = Some(outcome);
                return;
            }
        }
    }

    /// Declares checkmate or stalemate when the side to move has no legal
    /// move. Otherwise the status only reports whether that side is in check.
    pub fn evaluate_terminal(&mut self) -> GameStatus {
        if self.outcome.is_none() && self.pending_promotion.is_none() {
            let side = self.board.side_to_move;
            if !self.move_generator.has_legal_move(&self.board, side) {
                let outcome = if self.is_in_check(side) {
                    Outcome::Checkmate { winner: side.opposite() }
                } else {
                    Outcome::Stalemate
                };
                info!("game over: {:?}", outcome);
                self.outcome = Some(outcome);
            }
        }
        self.status()
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}
