use crate::board::{file_of, row_of, square_at, Board, Color, Piece};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2),
    (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0), (-1, 0), (0, 1), (0, -1),
    (1, 1), (1, -1), (-1, 1), (-1, -1),
];

const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub piece: Piece,
    pub captured_piece: Option<Piece>,
    pub promotion: Option<Piece>,
    pub is_en_passant: bool,
    pub is_castling: bool,
}

impl Move {
    pub fn new(from: u8, to: u8, piece: Piece) -> Self {
        Self {
            from,
            to,
            piece,
            captured_piece: None,
            promotion: None,
            is_en_passant: false,
            is_castling: false,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }
}

/// Stateless rules oracle. Every query reads a board snapshot and never
/// mutates it; king-safety checks run on scratch copies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        MoveGenerator
    }

    pub fn is_square_under_attack(&self, board: &Board, square: u8, attacker_color: Color) -> bool {
        let file = file_of(square) as i8;
        let row = row_of(square) as i8;
        let attacker_at = |target: Option<u8>, kinds: &[Piece]| {
            matches!(
                target.and_then(|sq| board.get_piece_at(sq)),
                Some((piece, color)) if color == attacker_color && kinds.contains(&piece)
            )
        };

        // A pawn attacks diagonally forward, so look one row behind the square
        // from the attacker's point of view.
        let pawn_row = row - attacker_color.forward();
        if attacker_at(square_at(file - 1, pawn_row), &[Piece::Pawn])
            || attacker_at(square_at(file + 1, pawn_row), &[Piece::Pawn])
        {
            return true;
        }

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(df, dr)| attacker_at(square_at(file + df, row + dr), &[Piece::Knight]))
        {
            return true;
        }

        if KING_OFFSETS
            .iter()
            .any(|&(df, dr)| attacker_at(square_at(file + df, row + dr), &[Piece::King]))
        {
            return true;
        }

        let sliders = [
            (&ORTHOGONALS, [Piece::Rook, Piece::Queen]),
            (&DIAGONALS, [Piece::Bishop, Piece::Queen]),
        ];
        for (directions, kinds) in sliders.iter() {
            for &(df, dr) in directions.iter() {
                let (mut f, mut r) = (file + df, row + dr);
                while let Some(target) = square_at(f, r) {
                    if board.get_piece_at(target).is_some() {
                        if attacker_at(Some(target), &kinds[..]) {
                            return true;
                        }
                        // Any other piece blocks the ray
                        break;
                    }
                    f += df;
                    r += dr;
                }
            }
        }

        false
    }

    pub fn is_king_in_check(&self, board: &Board, color: Color) -> bool {
        match board.king_square(color) {
            Some(king_square) => self.is_square_under_attack(board, king_square, color.opposite()),
            None => false, // No king on synthetic boards
        }
    }

    /// Destinations the piece on `from` can reach by movement shape alone.
    /// Moves that leave the mover's king attacked are still included.
    pub fn pseudo_moves(&self, board: &Board, from: u8, side: Color) -> Vec<u8> {
        let piece = match board.get_piece_at(from) {
            Some((piece, color)) if color == side => piece,
            _ => return Vec::new(),
        };
        let file = file_of(from) as i8;
        let row = row_of(from) as i8;
        let mut moves = Vec::new();

        match piece {
            Piece::Pawn => {
                let forward = side.forward();
                if let Some(one) = square_at(file, row + forward) {
                    if board.is_empty(one) {
                        moves.push(one);
                        if row_of(from) == side.pawn_start_row() {
                            if let Some(two) = square_at(file, row + 2 * forward) {
                                if board.is_empty(two) {
                                    moves.push(two);
                                }
                            }
                        }
                    }
                }
                for df in [-1, 1] {
                    if let Some(target) = square_at(file + df, row + forward) {
                        if board.is_color(target, side.opposite())
                            || board.en_passant_square == Some(target)
                        {
                            moves.push(target);
                        }
                    }
                }
            }
            Piece::Knight => self.push_steps(&KNIGHT_OFFSETS, file, row, &mut moves),
            Piece::King => {
                self.push_steps(&KING_OFFSETS, file, row, &mut moves);
                self.push_castling(board, from, side, &mut moves);
            }
            Piece::Bishop => self.push_rays(board, &DIAGONALS, file, row, &mut moves),
            Piece::Rook => self.push_rays(board, &ORTHOGONALS, file, row, &mut moves),
            Piece::Queen => {
                self.push_rays(board, &ORTHOGONALS, file, row, &mut moves);
                self.push_rays(board, &DIAGONALS, file, row, &mut moves);
            }
        }

        moves.retain(|&to| !board.is_color(to, side));
        moves
    }

    fn push_steps(&self, offsets: &[(i8, i8)], file: i8, row: i8, moves: &mut Vec<u8>) {
        moves.extend(offsets.iter().filter_map(|&(df, dr)| square_at(file + df, row + dr)));
    }

    fn push_rays(
        &self,
        board: &Board,
        directions: &[(i8, i8)],
        file: i8,
        row: i8,
        moves: &mut Vec<u8>,
    ) {
        for &(df, dr) in directions {
            let (mut f, mut r) = (file + df, row + dr);
            while let Some(target) = square_at(f, r) {
                moves.push(target);
                if !board.is_empty(target) {
                    break;
                }
                f += df;
                r += dr;
            }
        }
    }

    fn push_castling(&self, board: &Board, from: u8, side: Color, moves: &mut Vec<u8>) {
        if from != side.king_home() {
            return;
        }
        let enemy = side.opposite();
        let rights = board.castling_rights;
        let safe = |squares: &[u8]| {
            squares.iter().all(|&sq| !self.is_square_under_attack(board, sq, enemy))
        };

        if rights.kingside(side)
            && board.get_piece_at(side.kingside_rook_home()) == Some((Piece::Rook, side))
            && board.is_empty(from + 1)
            && board.is_empty(from + 2)
            && safe(&[from, from + 1, from + 2])
        {
            moves.push(from + 2);
        }

        if rights.queenside(side)
            && board.get_piece_at(side.queenside_rook_home()) == Some((Piece::Rook, side))
            && board.is_empty(from - 1)
            && board.is_empty(from - 2)
            && board.is_empty(from - 3)
            && safe(&[from, from - 1, from - 2])
        {
            moves.push(from - 2);
        }
    }

    /// Pseudo-legal destinations that do not leave `side`'s king attacked.
    pub fn legal_moves(&self, board: &Board, from: u8, side: Color) -> Vec<u8> {
        self.pseudo_moves(board, from, side)
            .into_iter()
            .filter(|&to| {
                let scratch = self.simulate(board, from, to);
                !self.is_king_in_check(&scratch, side)
            })
            .collect()
    }

    /// Relocates the piece on a copy of the board, removing an en-passant
    /// victim if there is one. The castling rook hop does not affect the
    /// king's safety and is skipped.
    fn simulate(&self, board: &Board, from: u8, to: u8) -> Board {
        let mut scratch = board.clone();
        if let Some(victim) = self.en_passant_victim(board, from, to) {
            scratch.set_piece(victim, None);
        }
        scratch.set_piece(to, board.get_piece_at(from));
        scratch.set_piece(from, None);
        scratch
    }

    /// Square of the pawn removed when `from -> to` is an en-passant capture.
    pub fn en_passant_victim(&self, board: &Board, from: u8, to: u8) -> Option<u8> {
        match board.get_piece_at(from) {
            Some((Piece::Pawn, color))
                if board.en_passant_square == Some(to) && board.is_empty(to) =>
            {
                square_at(file_of(to) as i8, row_of(to) as i8 - color.forward())
            }
            _ => None,
        }
    }

    /// Classifies `from -> to` on the current board. Does not check legality.
    pub fn describe_move(&self, board: &Board, from: u8, to: u8) -> Option<Move> {
        let (piece, color) = board.get_piece_at(from)?;
        let mut mv = Move::new(from, to, piece);

        if let Some(victim) = self.en_passant_victim(board, from, to) {
            mv.is_en_passant = true;
            mv.captured_piece = board.get_piece_at(victim).map(|(captured, _)| captured);
        } else {
            mv.captured_piece = board.get_piece_at(to).map(|(captured, _)| captured);
        }

        mv.is_castling = piece == Piece::King
            && from == color.king_home()
            && (file_of(to) as i8 - file_of(from) as i8).abs() == 2;
        Some(mv)
    }

    /// Every legal move for `side`, ordered by origin square.
    pub fn generate_moves(&self, board: &Board, side: Color) -> Vec<Move> {
        board
            .pieces(side)
            .flat_map(|(from, _)| {
                self.legal_moves(board, from, side)
                    .into_iter()
                    .filter_map(move |to| self.describe_move(board, from, to))
            })
            .collect()
    }

    pub fn has_legal_move(&self, board: &Board, side: Color) -> bool {
        board
            .pieces(side)
            .any(|(from, _)| !self.legal_moves(board, from, side).is_empty())
    }
}
