pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod movegen;
pub mod opponent;
pub mod session;
pub mod terminal;

pub use board::{Board, CastlingRights, Color, Piece};
pub use error::{ChessError, Result};
pub use game::{GameState, GameStatus, MoveOutcome, Outcome};
pub use movegen::{Move, MoveGenerator};
pub use opponent::Opponent;
pub use session::ChessSession;

#[cfg(test)]
mod tests {
    use super::*;
    use board::parse_square;
    use logging::init_test_logging;

    fn sq(name: &str) -> u8 {
        parse_square(name).unwrap()
    }

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    fn play(state: &mut GameState, from: &str, to: &str) -> MoveOutcome {
        state.apply_move(sq(from), sq(to), None).unwrap()
    }

    fn sorted(mut squares: Vec<u8>) -> Vec<u8> {
        squares.sort_unstable();
        squares
    }

    fn changed_squares(before: &Board, after: &Board) -> Vec<u8> {
        (0..64u8)
            .filter(|&square| before.get_piece_at(square) != after.get_piece_at(square))
            .collect()
    }

    #[test]
    fn test_initial_position() {
        let state = GameState::new();
        let moves = state.all_legal_moves();

        // White should have 20 legal moves in the initial position
        assert_eq!(moves.len(), 20);
        assert_eq!(state.status(), GameStatus::ToMove(Color::White));

        let generator = MoveGenerator::new();
        for mv in moves {
            assert!(generator.pseudo_moves(&state.board, mv.from, Color::White).contains(&mv.to));
        }
    }

    #[test]
    fn test_attack_query() {
        let generator = MoveGenerator::new();

        // Black pawn on d4 attacks toward rank 1
        let b = board("4k3/8/8/8/3p4/8/8/4K3 w - - 0 1");
        assert!(generator.is_square_under_attack(&b, sq("c3"), Color::Black));
        assert!(generator.is_square_under_attack(&b, sq("e3"), Color::Black));
        assert!(!generator.is_square_under_attack(&b, sq("c5"), Color::Black));
        assert!(!generator.is_square_under_attack(&b, sq("d3"), Color::Black));

        // Rays stop at the first piece
        let b = board("4k3/8/8/8/n7/8/8/R3K3 w - - 0 1");
        assert!(generator.is_square_under_attack(&b, sq("a4"), Color::White));
        assert!(!generator.is_square_under_attack(&b, sq("a5"), Color::White));
        assert!(generator.is_square_under_attack(&b, sq("b2"), Color::Black));
        assert!(generator.is_square_under_attack(&b, sq("d2"), Color::White));
    }

    #[test]
    fn test_pawn_moves() {
        let generator = MoveGenerator::new();
        let start = Board::new();
        assert_eq!(
            sorted(generator.pseudo_moves(&start, sq("e2"), Color::White)),
            sorted(vec![sq("e3"), sq("e4")])
        );

        // Blocked double push, diagonal capture only onto an enemy
        let b = board("4k3/8/8/8/8/3pN3/4P3/4K3 w - - 0 1");
        assert_eq!(generator.pseudo_moves(&b, sq("e2"), Color::White), vec![sq("d3")]);

        // Wrong side asks for nothing
        assert!(generator.pseudo_moves(&start, sq("e2"), Color::Black).is_empty());
    }

    #[test]
    fn test_piece_shapes() {
        let generator = MoveGenerator::new();
        let b = board("4k3/8/8/8/3R4/8/8/4K3 w - - 0 1");
        assert_eq!(generator.pseudo_moves(&b, sq("d4"), Color::White).len(), 14);

        let b = board("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1");
        assert_eq!(generator.pseudo_moves(&b, sq("d4"), Color::White).len(), 27);

        let b = board("4k3/8/8/8/8/8/8/N3K3 w - - 0 1");
        assert_eq!(
            sorted(generator.pseudo_moves(&b, sq("a1"), Color::White)),
            sorted(vec![sq("b3"), sq("c2")])
        );

        // Bishop stops at its own pawn and takes the enemy one
        let b = board("4k3/8/5p2/8/3B4/2P5/8/4K3 w - - 0 1");
        let moves = generator.pseudo_moves(&b, sq("d4"), Color::White);
        assert!(moves.contains(&sq("f6")));
        assert!(!moves.contains(&sq("g7")));
        assert!(!moves.contains(&sq("c3")));
    }

    #[test]
    fn test_pinned_piece_is_excluded() {
        let generator = MoveGenerator::new();

        let b = board("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1");
        assert!(!generator.pseudo_moves(&b, sq("e2"), Color::White).is_empty());
        assert!(generator.legal_moves(&b, sq("e2"), Color::White).is_empty());

        // A pinned rook may still slide along the pin
        let b = board("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1");
        assert_eq!(
            sorted(generator.legal_moves(&b, sq("e2"), Color::White)),
            sorted(vec![sq("e3"), sq("e4"), sq("e5"), sq("e6"), sq("e7")])
        );

        // The king may not step into an attack
        let b = board("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1");
        let king = generator.legal_moves(&b, sq("e1"), Color::White);
        assert_eq!(sorted(king), sorted(vec![sq("d2"), sq("f1")]));
    }

    #[test]
    fn test_en_passant() {
        init_test_logging();
        let mut state = GameState::new();
        play(&mut state, "e2", "e4");
        assert_eq!(state.board.en_passant_square, Some(sq("e3")));
        play(&mut state, "a7", "a6");
        assert_eq!(state.board.en_passant_square, None);
        play(&mut state, "e4", "e5");
        play(&mut state, "d7", "d5");
        assert_eq!(state.board.en_passant_square, Some(sq("d6")));
        assert!(state.legal_moves(sq("e5")).contains(&sq("d6")));

        let mut missed = state.clone();
        play(&mut missed, "a2", "a3");
        play(&mut missed, "a6", "a5");
        assert!(!missed.legal_moves(sq("e5")).contains(&sq("d6")));

        let before = state.board.clone();
        let outcome = play(&mut state, "e5", "d6");
        match outcome {
            MoveOutcome::Played { mv, .. } => {
                assert!(mv.is_en_passant);
                assert_eq!(mv.captured_piece, Some(Piece::Pawn));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(state.board.get_piece_at(sq("d5")), None);
        assert_eq!(state.board.get_piece_at(sq("d6")), Some((Piece::Pawn, Color::White)));
        assert_eq!(state.board.piece_count(), before.piece_count() - 1);
        assert_eq!(
            changed_squares(&before, &state.board),
            vec![sq("d6"), sq("d5"), sq("e5")]
        );
    }

    #[test]
    fn test_en_passant_cannot_expose_king() {
        // Taking d6 would clear the fifth rank between the rook and the king
        let b = board("4k3/8/8/K2pP2r/8/8/8/8 w - d6 0 1");
        let generator = MoveGenerator::new();
        assert!(generator.pseudo_moves(&b, sq("e5"), Color::White).contains(&sq("d6")));
        assert!(!generator.legal_moves(&b, sq("e5"), Color::White).contains(&sq("d6")));
    }

    #[test]
    fn test_castling() {
        let mut state = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let king = state.legal_moves(sq("e1"));
        assert!(king.contains(&sq("g1")));
        assert!(king.contains(&sq("c1")));

        let before = state.board.clone();
        match play(&mut state, "e1", "g1") {
            MoveOutcome::Played { mv, .. } => assert!(mv.is_castling),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(state.board.get_piece_at(sq("f1")), Some((Piece::Rook, Color::White)));
        assert_eq!(state.board.get_piece_at(sq("h1")), None);
        assert_eq!(state.board.piece_count(), before.piece_count());
        assert!(!state.board.castling_rights.white_kingside);
        assert!(!state.board.castling_rights.white_queenside);
        assert!(state.board.castling_rights.black_queenside);

        play(&mut state, "e8", "c8");
        assert_eq!(state.board.get_piece_at(sq("d8")), Some((Piece::Rook, Color::Black)));
        assert_eq!(state.board.get_piece_at(sq("a8")), None);
        assert_eq!(state.board.to_fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 0 1");
    }

    #[test]
    fn test_castling_requires_rights() {
        let generator = MoveGenerator::new();
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1");
        let king = generator.legal_moves(&b, sq("e1"), Color::White);
        assert!(!king.contains(&sq("g1")));
        assert!(!king.contains(&sq("c1")));
    }

    #[test]
    fn test_castling_through_attack() {
        let generator = MoveGenerator::new();
        let castles = |fen: &str| {
            let b = board(fen);
            let king = generator.pseudo_moves(&b, sq("e1"), Color::White);
            (king.contains(&sq("g1")), king.contains(&sq("c1")))
        };

        // Transit square f1 attacked
        assert_eq!(castles("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1"), (false, true));
        // Destination g1 attacked
        assert_eq!(castles("4k1r1/8/8/8/8/8/8/R3K2R w KQ - 0 1"), (false, true));
        // King in check
        assert_eq!(castles("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1"), (false, false));
        // b1 is not on the king's path
        assert_eq!(castles("1r2k3/8/8/8/8/8/8/R3K2R w KQ - 0 1"), (true, true));
    }

    #[test]
    fn test_castling_needs_empty_squares() {
        let generator = MoveGenerator::new();
        let b = board("4k3/8/8/8/8/8/8/RN2K1NR w KQ - 0 1");
        let king = generator.pseudo_moves(&b, sq("e1"), Color::White);
        assert!(!king.contains(&sq("g1")));
        assert!(!king.contains(&sq("c1")));

        let b = board("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1");
        let king = generator.pseudo_moves(&b, sq("e1"), Color::White);
        assert!(king.contains(&sq("g1")));
        assert!(!king.contains(&sq("c1")));
    }

    #[test]
    fn test_castling_rights_revoked() {
        let mut state = GameState::from_fen("r3k2r/8/1N6/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        // Knight takes the rook on its home corner
        play(&mut state, "b6", "a8");
        let rights = state.board.castling_rights;
        assert!(!rights.black_queenside);
        assert!(rights.black_kingside);
        assert!(rights.white_queenside && rights.white_kingside);

        play(&mut state, "h8", "h7");
        assert!(!state.board.castling_rights.black_kingside);
        play(&mut state, "a1", "a2");
        assert!(!state.board.castling_rights.white_queenside);

        // Going home again does not restore anything
        play(&mut state, "h7", "h8");
        assert!(!state.board.castling_rights.black_kingside);
        assert!(state.board.castling_rights.white_kingside);
        assert!(!state.legal_moves(sq("e1")).contains(&sq("c1")));
    }

    #[test]
    fn test_promotion() {
        let mut state = GameState::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let outcome = play(&mut state, "a7", "a8");
        assert!(matches!(
            outcome,
            MoveOutcome::AwaitingPromotion { square, .. } if square == sq("a8")
        ));
        assert_eq!(state.board.side_to_move, Color::White);
        assert!(state.locked);
        assert_eq!(state.status(), GameStatus::AwaitingPromotion(Color::White));
        assert!(state.all_legal_moves().is_empty());
        assert_eq!(state.apply_move(sq("a1"), sq("a2"), None), Err(ChessError::PromotionPending));
        assert_eq!(
            state.resolve_promotion(Piece::King),
            Err(ChessError::InvalidPromotion("king".to_string()))
        );

        state.resolve_promotion(Piece::Rook).unwrap();
        assert_eq!(state.board.get_piece_at(sq("a8")), Some((Piece::Rook, Color::White)));
        assert_eq!(state.board.side_to_move, Color::Black);
        assert!(!state.locked);
        assert_eq!(state.status(), GameStatus::InCheck(Color::Black));
        assert_eq!(state.resolve_promotion(Piece::Queen), Err(ChessError::NoPendingPromotion));
    }

    #[test]
    fn test_promotion_with_choice_supplied() {
        let mut state = GameState::from_fen("1r5k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let outcome = state.apply_move(sq("a7"), sq("b8"), Some(Piece::Knight)).unwrap();
        match outcome {
            MoveOutcome::Played { mv, .. } => {
                assert_eq!(mv.promotion, Some(Piece::Knight));
                assert_eq!(mv.captured_piece, Some(Piece::Rook));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(state.board.get_piece_at(sq("b8")), Some((Piece::Knight, Color::White)));
        assert_eq!(state.board.side_to_move, Color::Black);
        assert_eq!(state.board.piece_count(), 3);
    }

    #[test]
    fn test_check() {
        let state = GameState::from_fen("4k3/8/8/8/8/8/8/3KQ3 b - - 0 1").unwrap();
        assert!(state.is_in_check(Color::Black));
        assert!(!state.is_in_check(Color::White));
        assert_eq!(state.status(), GameStatus::InCheck(Color::Black));
    }

    #[test]
    fn test_checkmate() {
        // Black king on a1 boxed in by a defended queen
        let mut state = GameState::from_fen("8/8/8/8/8/8/8/kQK5 b - - 0 1").unwrap();
        assert!(state.all_legal_moves().is_empty());
        assert_eq!(
            state.evaluate_terminal(),
            GameStatus::Over(Outcome::Checkmate { winner: Color::White })
        );
        assert_eq!(state.side_to_move(), None);
    }

    #[test]
    fn test_stalemate() {
        let state = GameState::from_fen("8/8/8/8/8/1q6/2k5/K7 w - - 0 1").unwrap();
        assert!(!state.is_in_check(Color::White));
        assert_eq!(state.status(), GameStatus::Over(Outcome::Stalemate));
    }

    #[test]
    fn test_checkmate_ends_play() {
        let mut state = GameState::new();
        play(&mut state, "f2", "f3");
        play(&mut state, "e7", "e5");
        play(&mut state, "g2", "g4");
        match play(&mut state, "d8", "h4") {
            MoveOutcome::Played { status, .. } => {
                assert_eq!(status, GameStatus::Over(Outcome::Checkmate { winner: Color::Black }))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(state.is_over());
        assert_eq!(state.apply_move(sq("e1"), sq("f2"), None), Err(ChessError::GameOver));
        assert!(state.legal_moves(sq("e2")).is_empty());
    }

    #[test]
    fn test_missing_king_ends_the_game() {
        let mut state = GameState::from_fen("4k3/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert_eq!(state.outcome, Some(Outcome::KingCaptured { winner: Color::Black }));
        assert_eq!(state.side_to_move(), None);
        assert_eq!(state.apply_move(sq("e8"), sq("e7"), None), Err(ChessError::GameOver));
    }

    #[test]
    fn test_move_validation() {
        let mut state = GameState::new();
        let fresh = state.clone();

        assert_eq!(
            state.apply_move(sq("e2"), sq("e5"), None),
            Err(ChessError::IllegalMove { from: sq("e2"), to: sq("e5") })
        );
        assert_eq!(state.apply_move(sq("e7"), sq("e5"), None), Err(ChessError::NotYourTurn));
        assert_eq!(
            state.apply_move(sq("e4"), sq("e5"), None),
            Err(ChessError::IllegalMove { from: sq("e4"), to: sq("e5") })
        );
        assert_eq!(state.apply_move(64, 0, None), Err(ChessError::InvalidSquare(64)));
        assert_eq!(
            state.apply_move(sq("e2"), sq("e4"), Some(Piece::Pawn)),
            Err(ChessError::InvalidPromotion("pawn".to_string()))
        );
        assert_eq!(state, fresh);
    }

    #[test]
    fn test_move_changes_only_what_it_should() {
        let mut state = GameState::new();
        let before = state.board.clone();
        play(&mut state, "g1", "f3");
        assert_eq!(changed_squares(&before, &state.board), vec![sq("f3"), sq("g1")]);
        assert_eq!(state.board.piece_count(), 32);

        play(&mut state, "d7", "d5");
        play(&mut state, "f3", "e5");
        play(&mut state, "d5", "d4");
        let before = state.board.clone();
        play(&mut state, "e5", "f7");
        assert_eq!(changed_squares(&before, &state.board), vec![sq("f7"), sq("e5")]);
        assert_eq!(state.board.piece_count(), 31);
    }

    #[test]
    fn test_opponent_prefers_captures() {
        let state = GameState::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 b - - 0 1").unwrap();
        for seed in 0..20 {
            let mv = Opponent::with_seed(seed).choose_move(&state).unwrap();
            assert_eq!((mv.from, mv.to), (sq("d5"), sq("e4")));
        }
    }

    #[test]
    fn test_opponent_counts_en_passant_as_capture() {
        // d4xe3 en passant is Black's only capture
        let state = GameState::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        for seed in 0..20 {
            let mv = Opponent::with_seed(seed).choose_move(&state).unwrap();
            assert_eq!((mv.from, mv.to), (sq("d4"), sq("e3")));
            assert!(mv.is_en_passant);
            assert!(mv.is_capture());
        }
    }

    #[test]
    fn test_opponent_picks_among_quiet_moves() {
        let state = GameState::new();
        let mut seen = std::collections::HashSet::new();
        for seed in 0..50 {
            let mv = Opponent::with_seed(seed).choose_move(&state).unwrap();
            assert!(state.legal_moves(mv.from).contains(&mv.to));
            seen.insert((mv.from, mv.to));
        }
        assert!(seen.len() > 1);

        let a = Opponent::with_seed(9).choose_move(&state);
        let b = Opponent::with_seed(9).choose_move(&state);
        assert_eq!(a, b);
    }

    #[test]
    fn test_opponent_without_moves() {
        let state = GameState::from_fen("8/8/8/8/8/8/8/kQK5 b - - 0 1").unwrap();
        assert_eq!(Opponent::with_seed(1).choose_move(&state), None);
    }

    #[test]
    fn test_perft_initial_position() {
        let state = GameState::new();
        assert_eq!(perft(&state, 1), 20);
        assert_eq!(perft(&state, 2), 400);
        assert_eq!(perft(&state, 3), 8902);
    }

    #[test]
    fn test_perft_kiwipete() {
        let kiwipete = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let state = GameState::from_fen(kiwipete).unwrap();
        assert_eq!(perft(&state, 1), 48);
        assert_eq!(perft(&state, 2), 2039);
    }

    // Counts leaf positions; promotions count once since the piece choice is
    // made after the move.
    fn perft(state: &GameState, depth: u32) -> u64 {
        let moves = state.all_legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0;
        for mv in moves {
            let mut next = state.clone();
            next.apply_move(mv.from, mv.to, Some(Piece::Queen)).unwrap();
            nodes += perft(&next, depth - 1);
        }
        nodes
    }
}
