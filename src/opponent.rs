use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::trace;

use crate::board::square_name;
use crate::game::GameState;
use crate::movegen::Move;

/// The pet's move policy: grab something if it can, otherwise wander.
///
/// One ply, no evaluation. Every legal move of the side to move is a
/// candidate; if any of them captures, the pick is uniform over the captures,
/// else uniform over everything.
pub struct Opponent {
    rng: StdRng,
}

impl Opponent {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `None` when the side to move has no legal move or the game does not
    /// accept moves right now.
    pub fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        let moves = state.all_legal_moves();
        let captures: Vec<Move> = moves.iter().copied().filter(Move::is_capture).collect();
        trace!("opponent sees {} legal moves, {} captures", moves.len(), captures.len());

        let pool = if captures.is_empty() { &moves } else { &captures };
        let choice = pool.choose(&mut self.rng).copied();
        if let Some(mv) = choice {
            trace!("opponent picks {} -> {}", square_name(mv.from), square_name(mv.to));
        }
        choice
    }
}

impl Default for Opponent {
    fn default() -> Self {
        Opponent::new()
    }
}
