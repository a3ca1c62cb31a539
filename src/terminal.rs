use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::{Context, Result};
use tracing::debug;

use crate::board::{parse_square, square_name, Piece};
use crate::game::MoveOutcome;
use crate::session::{ChessSession, SelectionOutcome};

const HELP: &str = "\
Commands:
  <square>          click a square, e.g. e2
  <from> <to>       move in one go, e.g. e2 e4
  promote <q|r|b|n> pick the piece for a waiting pawn
  hint <square>     list where that piece can go
  board             show the board
  status            show whose turn it is
  fen               print the position as FEN
  new               start over
  help              this text
  quit              leave";

/// Line-based stand-in for the graphical board. Each command is translated
/// into the same clicks and choices a rendering layer would send.
pub struct TerminalHandler {
    session: ChessSession,
}

impl TerminalHandler {
    pub fn new(session: ChessSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ChessSession {
        &self.session
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        writeln!(stdout, "{}\n{}", self.render(), self.session.status_text())?;
        let reply = self.play_pending_reply();
        if !reply.is_empty() {
            writeln!(stdout, "{}", reply)?;
        }
        stdout.flush()?;

        loop {
            write!(stdout, "> ")?;
            stdout.flush()?;
            line.clear();
            if reader.read_line(&mut line).context("Failed to read from stdin")? == 0 {
                break;
            }
            let command = line.trim();
            if command == "quit" || command == "exit" {
                break;
            }
            let response = self.handle_command(command)?;
            if !response.is_empty() {
                writeln!(stdout, "{}", response)?;
            }
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(String::new());
        }

        let mut response = match parts.as_slice() {
            ["help"] => return Ok(HELP.to_string()),
            ["board"] => self.render(),
            ["status"] => return Ok(self.session.status_text()),
            ["fen"] => return Ok(self.session.board().to_fen()),
            ["new"] => {
                self.session.on_new_game();
                self.render()
            }
            ["hint", name] => return Ok(self.handle_hint(name)),
            ["promote", input] => self.handle_promote(input),
            [name] => self.handle_click(name),
            [from, to] => {
                let from_square = parse_square(from);
                // An already selected piece would be deselected by a second click
                if from_square.is_some() && self.session.selection() == from_square {
                    self.handle_click(to)
                } else {
                    let first = self.handle_click(from);
                    if from_square.is_some() && self.session.selection() == from_square {
                        self.handle_click(to)
                    } else {
                        first
                    }
                }
            }
            _ => return Ok(format!("Unknown command: {}\n{}", command, HELP)),
        };

        let reply = self.play_pending_reply();
        if !reply.is_empty() {
            response.push('\n');
            response.push_str(&reply);
        }
        response.push('\n');
        response.push_str(&self.session.status_text());
        Ok(response)
    }

    fn handle_click(&mut self, name: &str) -> String {
        let square = match parse_square(name) {
            Some(square) => square,
            None => return format!("Not a square: {}", name),
        };
        match self.session.on_square_selected(square) {
            SelectionOutcome::Selected(square) => {
                format!("Selected {} (can go to: {})", square_name(square), self.hint_names(square))
            }
            SelectionOutcome::Deselected => "Selection cleared".to_string(),
            SelectionOutcome::Moved(MoveOutcome::Played { mv, .. }) => {
                let board = self.render();
                format!("You play {}{}\n{}", square_name(mv.from), square_name(mv.to), board)
            }
            SelectionOutcome::Moved(MoveOutcome::AwaitingPromotion { .. }) => self.render(),
            SelectionOutcome::Ignored => String::new(),
        }
    }

    fn handle_hint(&self, name: &str) -> String {
        match parse_square(name) {
            Some(square) => {
                let hints = self.hint_names(square);
                if hints.is_empty() {
                    format!("No moves from {}", square_name(square))
                } else {
                    hints
                }
            }
            None => format!("Not a square: {}", name),
        }
    }

    fn hint_names(&self, square: u8) -> String {
        let hints: Vec<String> =
            self.session.legal_destinations(square).into_iter().map(square_name).collect();
        hints.join(" ")
    }

    /// Accepts a FEN letter (`q`) or a full name (`queen`).
    fn handle_promote(&mut self, input: &str) -> String {
        let by_letter = match input.chars().collect::<Vec<_>>().as_slice() {
            [letter] => Piece::from_letter(*letter),
            _ => None,
        };
        let kind = Piece::PROMOTION_CHOICES
            .into_iter()
            .find(|kind| by_letter == Some(*kind) || input.eq_ignore_ascii_case(kind.name()));
        let Some(kind) = kind else {
            return format!("Not a promotion piece: {}", input);
        };
        match self.session.on_promotion_choice(kind) {
            Ok(_) => self.render(),
            Err(e) => {
                debug!("promotion input ignored: {}", e);
                String::new()
            }
        }
    }

    /// Waits out the pet's thinking time, then plays its move.
    fn play_pending_reply(&mut self) -> String {
        if !self.session.opponent_pending() {
            return String::new();
        }
        let delay = self.session.opponent_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        match self.session.play_opponent_move() {
            Some(mv) => format!(
                "{} plays {}{}\n{}",
                self.session.pet_name(),
                square_name(mv.from),
                square_name(mv.to),
                self.render()
            ),
            None => String::new(),
        }
    }

    /// The board with the selected square and its destinations marked.
    pub fn render(&self) -> String {
        let board = self.session.board();
        let selected = self.session.selection();
        let hints = selected
            .map(|square| self.session.legal_destinations(square))
            .unwrap_or_default();

        let mut out = String::new();
        for row in 0..8u8 {
            out.push_str(&format!("{} ", 8 - row));
            for file in 0..8u8 {
                let square = row * 8 + file;
                let symbol = match board.get_piece_at(square) {
                    Some((piece, color)) => piece.symbol(color),
                    None if hints.contains(&square) => '•',
                    None => '·',
                };
                if selected == Some(square) {
                    out.push('[');
                    out.push(symbol);
                    out.push(']');
                } else if hints.contains(&square) && board.get_piece_at(square).is_some() {
                    out.push('x');
                    out.push(symbol);
                    out.push(' ');
                } else {
                    out.push(' ');
                    out.push(symbol);
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out.push_str("   a  b  c  d  e  f  g  h");
        out
    }
}
