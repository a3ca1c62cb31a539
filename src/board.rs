use std::fmt;

use crate::error::{ChessError, Result};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    /// Kinds a pawn may be replaced with on the farthest rank.
    pub const PROMOTION_CHOICES: [Piece; 4] =
        [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    pub fn is_promotion_choice(self) -> bool {
        Self::PROMOTION_CHOICES.contains(&self)
    }

    /// Parses a single-letter piece code, ignoring case (`n` and `N` are both knights).
    pub fn from_letter(letter: char) -> Option<Piece> {
        match letter.to_ascii_lowercase() {
            'p' => Some(Piece::Pawn),
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            'k' => Some(Piece::King),
            _ => None,
        }
    }

    /// FEN letter: upper case for White, lower case for Black.
    pub fn letter(self, color: Color) -> char {
        let letter = match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };
        match color {
            Color::White => letter.to_ascii_uppercase(),
            Color::Black => letter,
        }
    }

    pub fn symbol(self, color: Color) -> char {
        match (color, self) {
            (Color::White, Piece::King) => '♔',
            (Color::White, Piece::Queen) => '♕',
            (Color::White, Piece::Rook) => '♖',
            (Color::White, Piece::Bishop) => '♗',
            (Color::White, Piece::Knight) => '♘',
            (Color::White, Piece::Pawn) => '♙',
            (Color::Black, Piece::King) => '♚',
            (Color::Black, Piece::Queen) => '♛',
            (Color::Black, Piece::Rook) => '♜',
            (Color::Black, Piece::Bishop) => '♝',
            (Color::Black, Piece::Knight) => '♞',
            (Color::Black, Piece::Pawn) => '♟',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Piece::Pawn => "pawn",
            Piece::Knight => "knight",
            Piece::Bishop => "bishop",
            Piece::Rook => "rook",
            Piece::Queen => "queen",
            Piece::King => "king",
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Board orientation: row 0 is Black's back rank (rank 8), row 7 is White's (rank 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single pawn step.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn promotion_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn king_home(self) -> u8 {
        match self {
            Color::White => 60,
            Color::Black => 4,
        }
    }

    pub fn kingside_rook_home(self) -> u8 {
        self.king_home() + 3
    }

    pub fn queenside_rook_home(self) -> u8 {
        self.king_home() - 4
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    pub fn revoke_all(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// Revokes whichever right belongs to the rook whose home corner is `square`.
    pub fn revoke_corner(&mut self, square: u8) {
        match square {
            63 => self.white_kingside = false,
            56 => self.white_queenside = false,
            7 => self.black_kingside = false,
            0 => self.black_queenside = false,
            _ => {}
        }
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        CastlingRights::ALL
    }
}

pub fn file_of(square: u8) -> u8 {
    square % 8
}

pub fn row_of(square: u8) -> u8 {
    square / 8
}

/// Square index for a (file, row) pair, or `None` when it falls off the board.
pub fn square_at(file: i8, row: i8) -> Option<u8> {
    if (0..8).contains(&file) && (0..8).contains(&row) {
        Some((row * 8 + file) as u8)
    } else {
        None
    }
}

/// Algebraic name of a square, e.g. `0` is "a8" and `60` is "e1".
pub fn square_name(square: u8) -> String {
    if square >= 64 {
        return format!("#{}", square);
    }
    let file = (b'a' + file_of(square)) as char;
    let rank = (b'8' - row_of(square)) as char;
    format!("{}{}", file, rank)
}

pub fn parse_square(name: &str) -> Option<u8> {
    let bytes = name.trim().as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some((b'8' - rank) * 8 + (file - b'a'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub squares: [Option<(Piece, Color)>; 64],
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<u8>,
}

impl Board {
    pub fn new() -> Self {
        const BACK_RANK: [Piece; 8] = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];

        let mut board = Board::empty();
        for (file, &piece) in BACK_RANK.iter().enumerate() {
            board.squares[file] = Some((piece, Color::Black));
            board.squares[8 + file] = Some((Piece::Pawn, Color::Black));
            board.squares[48 + file] = Some((Piece::Pawn, Color::White));
            board.squares[56 + file] = Some((piece, Color::White));
        }
        board.castling_rights = CastlingRights::ALL;
        board
    }

    /// A board with no pieces, White to move and no castling rights.
    pub fn empty() -> Self {
        Self {
            squares: [None; 64],
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant_square: None,
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let invalid = |reason: &str| ChessError::InvalidFen(format!("{} ({})", fen, reason));
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or_else(|| invalid("empty"))?;

        let mut board = Board::empty();
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(invalid("expected 8 ranks"));
        }
        for (row, text) in rows.iter().enumerate() {
            let mut file = 0usize;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let piece =
                        Piece::from_letter(c).ok_or_else(|| invalid("unknown piece letter"))?;
                    let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
                    if file >= 8 {
                        return Err(invalid("rank too long"));
                    }
                    board.squares[row * 8 + file] = Some((piece, color));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(invalid("rank does not have 8 files"));
            }
        }

        board.side_to_move = match fields.next().unwrap_or("w") {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(invalid("bad side to move")),
        };

        let castling = fields.next().unwrap_or("-");
        if castling != "-" {
            for c in castling.chars() {
                match c {
                    'K' => board.castling_rights.white_kingside = true,
                    'Q' => board.castling_rights.white_queenside = true,
                    'k' => board.castling_rights.black_kingside = true,
                    'q' => board.castling_rights.black_queenside = true,
                    _ => return Err(invalid("bad castling field")),
                }
            }
        }

        board.en_passant_square = match fields.next().unwrap_or("-") {
            "-" => None,
            name => Some(parse_square(name).ok_or_else(|| invalid("bad en passant square"))?),
        };

        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for row in 0..8 {
            let mut empty = 0;
            for file in 0..8 {
                match self.squares[row * 8 + file] {
                    Some((piece, color)) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.letter(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if row < 7 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        let rights = self.castling_rights;
        let mut castling = String::new();
        for (flag, c) in [
            (rights.white_kingside, 'K'),
            (rights.white_queenside, 'Q'),
            (rights.black_kingside, 'k'),
            (rights.black_queenside, 'q'),
        ] {
            if flag {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }
        fen.push(' ');
        fen.push_str(&castling);

        fen.push(' ');
        match self.en_passant_square {
            Some(square) => fen.push_str(&square_name(square)),
            None => fen.push('-'),
        }
        fen.push_str(" 0 1");
        fen
    }

    pub fn get_piece_at(&self, square: u8) -> Option<(Piece, Color)> {
        self.squares.get(square as usize).copied().flatten()
    }

    pub fn set_piece(&mut self, square: u8, piece: Option<(Piece, Color)>) {
        self.squares[square as usize] = piece;
    }

    pub fn is_empty(&self, square: u8) -> bool {
        self.get_piece_at(square).is_none()
    }

    pub fn is_color(&self, square: u8, color: Color) -> bool {
        matches!(self.get_piece_at(square), Some((_, c)) if c == color)
    }

    pub fn king_square(&self, color: Color) -> Option<u8> {
        self.squares
            .iter()
            .position(|&cell| cell == Some((Piece::King, color)))
            .map(|square| square as u8)
    }

    /// Squares and kinds of every piece belonging to `color`, in index order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (u8, Piece)> + '_ {
        self.squares.iter().enumerate().filter_map(move |(square, cell)| match cell {
            Some((piece, c)) if *c == color => Some((square as u8, *piece)),
            _ => None,
        })
    }

    pub fn piece_count(&self) -> usize {
        self.squares.iter().filter(|cell| cell.is_some()).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..8u8 {
            write!(f, "{} ", 8 - row)?;
            for file in 0..8u8 {
                let symbol = match self.squares[(row * 8 + file) as usize] {
                    Some((piece, color)) => piece.symbol(color),
                    None => '·',
                };
                write!(f, "{}", symbol)?;
                if file < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
