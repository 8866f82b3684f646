//! Minesweeper AI: picks one move per turn by skill tier.
//!
//! - Easy: a uniformly random available cell.
//! - Medium: basic counting rules on revealed numbers, else Easy.
//! - Hard: Medium's rules, then the 1-2-1 pattern, else Easy.
//!
//! The solver only reads `Board::visible`, i.e. what a human player sees,
//! and keeps nothing between calls. Moves go through the session like any
//! player move.

use log::trace;

use crate::board::Board;
use crate::rng::GameRng;
use crate::session::{GameSession, MoveOutcome};
use crate::types::{Actor, CellView, Difficulty, Move};

pub struct Solver {
    difficulty: Difficulty,
    rng: GameRng,
}

impl Solver {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_rng(difficulty, GameRng::new())
    }

    pub fn with_rng(difficulty: Difficulty, rng: GameRng) -> Self {
        Self { difficulty, rng }
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Choose a move for the current board, or `None` when there is nothing
    /// left to do (or the tier is `None`).
    pub fn decide(&mut self, board: &Board) -> Option<Move> {
        let chosen = match self.difficulty {
            Difficulty::None => return None,
            Difficulty::Easy => None,
            Difficulty::Medium => counting_move(board),
            Difficulty::Hard => counting_move(board).or_else(|| one_two_one_move(board)),
        };
        chosen.or_else(|| self.random_move(board))
    }

    /// Decide and submit one move as the AI.
    pub fn play(&mut self, session: &mut GameSession) -> Option<MoveOutcome> {
        let Some(mv) = self.decide(session.board()) else {
            trace!("no moves available");
            return None;
        };
        trace!("{:?} AI plays {:?}", self.difficulty, mv);
        let outcome = match mv {
            Move::Reveal(i) => session.request_reveal(i, Actor::Ai),
            Move::Flag(i) => session.request_flag_toggle(i, Actor::Ai),
        };
        Some(outcome)
    }

    fn random_move(&mut self, board: &Board) -> Option<Move> {
        let available: Vec<usize> = board.available_cells().iter().map(|c| c.index).collect();
        self.rng.choose(&available).map(|&i| Move::Reveal(i))
    }
}

// ─── Counting rules ─────────────────────────────────────────────────────────

/// Hidden (unflagged) neighbors and flagged-neighbor count around `index`.
fn neighborhood(board: &Board, index: usize) -> (Vec<usize>, usize) {
    let mut hidden = Vec::new();
    let mut flagged = 0;
    for &n in board.neighbors(index) {
        match board.visible(n) {
            CellView::Hidden => hidden.push(n),
            CellView::Flagged => flagged += 1,
            _ => {}
        }
    }
    (hidden, flagged)
}

/// First revealed number, in index order, where either
/// every hidden neighbor must be a mine (flag one) or every mine is already
/// flagged (reveal one).
fn counting_move(board: &Board) -> Option<Move> {
    for i in 0..board.size() {
        let CellView::Revealed(number) = board.visible(i) else {
            continue;
        };
        if number == 0 {
            continue;
        }
        let number = number as usize;
        let (hidden, flagged) = neighborhood(board, i);
        let Some(&first) = hidden.first() else {
            continue;
        };

        if flagged <= number && hidden.len() == number - flagged {
            trace!("cell {} ({}) forces mine at {}", i, number, first);
            return Some(Move::Flag(first));
        }
        if flagged == number {
            trace!("cell {} ({}) is satisfied, {} is safe", i, number, first);
            return Some(Move::Reveal(first));
        }
    }
    None
}

// ─── 1-2-1 pattern ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Index at (row, col) if it lies on the board.
fn at(board: &Board, row: isize, col: isize) -> Option<usize> {
    let side = board.side() as isize;
    if row < 0 || col < 0 || row >= side || col >= side {
        return None;
    }
    Some((row * side + col) as usize)
}

/// The three cells parallel to a run at perpendicular offset `offset`.
fn side_cells(board: &Board, row: isize, col: isize, axis: Axis, offset: isize) -> Option<[usize; 3]> {
    let cell = |k: isize| match axis {
        Axis::Horizontal => at(board, row + offset, col + k),
        Axis::Vertical => at(board, row + k, col + offset),
    };
    Some([cell(0)?, cell(1)?, cell(2)?])
}

/// Scan for the first 1-2-1 run (row-major, horizontal before vertical)
/// that has exactly one unopened side. On that side the two outer cells
/// are mines and the one facing the 2 is safe.
fn one_two_one_move(board: &Board) -> Option<Move> {
    let side = board.side() as isize;
    for row in 0..side {
        for col in 0..side {
            for axis in [Axis::Horizontal, Axis::Vertical] {
                let Some(unopened) = find_run(board, row, col, axis) else {
                    continue;
                };
                let [outer_a, inner, outer_b] = unopened;
                trace!("1-2-1 {:?} at ({}, {}), inner {}", axis, row, col, inner);
                for outer in [outer_a, outer_b] {
                    if board.visible(outer) == CellView::Hidden {
                        return Some(Move::Flag(outer));
                    }
                }
                if board.visible(inner) == CellView::Hidden {
                    return Some(Move::Reveal(inner));
                }
                return None;
            }
        }
    }
    None
}

/// If a 1-2-1 run starts at (row, col) along `axis`, return the cells of its
/// single unopened side.
fn find_run(board: &Board, row: isize, col: isize, axis: Axis) -> Option<[usize; 3]> {
    let run = side_cells(board, row, col, axis, 0)?;
    let numbers = run.map(|i| board.visible(i));
    if numbers != [CellView::Revealed(1), CellView::Revealed(2), CellView::Revealed(1)] {
        return None;
    }

    let unopened = |cells: &[usize; 3]| {
        cells
            .iter()
            .all(|&i| matches!(board.visible(i), CellView::Hidden | CellView::Flagged))
    };
    let before = side_cells(board, row, col, axis, -1).filter(|c| unopened(c));
    let after = side_cells(board, row, col, axis, 1).filter(|c| unopened(c));
    match (before, after) {
        (Some(cells), None) | (None, Some(cells)) => Some(cells),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver(difficulty: Difficulty) -> Solver {
        Solver::with_rng(difficulty, GameRng::from_seed(99))
    }

    fn apply(board: &mut Board, mv: Move) {
        match mv {
            Move::Reveal(i) => {
                board.reveal(i);
            }
            Move::Flag(i) => {
                board.toggle_flag(i);
            }
        }
    }

    /// 5x5 with mines at 1 and 3: row 1 reads 1 1 2 1 1 under a hidden row 0.
    fn horizontal_121() -> Board {
        let mut board = Board::with_mines(5, &[1, 3]);
        board.reveal(24);
        board
    }

    #[test]
    fn test_none_tier_never_moves() {
        let board = Board::with_mines(6, &[0]);
        assert_eq!(solver(Difficulty::None).decide(&board), None);
    }

    #[test]
    fn test_easy_picks_available_cell() {
        let mut board = Board::with_mines(6, &[0, 35]);
        board.reveal(17);
        let mut s = solver(Difficulty::Easy);
        for _ in 0..50 {
            let Some(Move::Reveal(i)) = s.decide(&board) else {
                panic!("easy tier must reveal");
            };
            assert!(board.cells()[i].is_hidden());
        }
    }

    #[test]
    fn test_no_moves_when_board_exhausted() {
        let mut board = Board::with_mines(6, &[0]);
        board.toggle_flag(0);
        board.reveal(35);
        assert!(board.available_cells().is_empty());
        for tier in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(solver(tier).decide(&board), None);
        }
    }

    #[test]
    fn test_medium_flags_forced_mine() {
        // Everything but the mine at 0 opens; cell 1 is a 1 with one hidden neighbor.
        let mut board = Board::with_mines(6, &[0]);
        board.reveal(35);
        assert_eq!(board.available_cells().len(), 1);
        assert_eq!(solver(Difficulty::Medium).decide(&board), Some(Move::Flag(0)));
    }

    #[test]
    fn test_medium_reveals_around_satisfied_number() {
        let mut board = Board::with_mines(6, &[0, 3]);
        for i in [1, 6, 7, 8] {
            board.reveal(i);
        }
        board.toggle_flag(0);
        // Cell 1 is a 1 with its mine flagged and 2 still hidden.
        assert_eq!(board.visible(1), CellView::Revealed(1));
        assert_eq!(board.visible(2), CellView::Hidden);
        assert_eq!(solver(Difficulty::Medium).decide(&board), Some(Move::Reveal(2)));
    }

    #[test]
    fn test_medium_falls_back_to_random() {
        let board = Board::with_mines(6, &[0]);
        let mv = solver(Difficulty::Medium).decide(&board);
        assert!(matches!(mv, Some(Move::Reveal(i)) if i < 36));
    }

    #[test]
    fn test_medium_ignores_121() {
        let board = horizontal_121();
        assert_eq!(counting_move(&board), None);
        let Some(Move::Reveal(_)) = solver(Difficulty::Medium).decide(&board) else {
            panic!("medium should guess");
        };
    }

    #[test]
    fn test_hard_121_flags_outer_then_resolves() {
        let mut board = horizontal_121();
        let mut s = solver(Difficulty::Hard);
        assert_eq!(s.decide(&board), Some(Move::Flag(1)));

        let mut moves = Vec::new();
        while let Some(mv) = s.decide(&board) {
            apply(&mut board, mv);
            moves.push(mv);
            assert!(moves.len() <= 10, "solver did not converge: {:?}", moves);
        }
        assert_eq!(
            moves,
            vec![
                Move::Flag(1),
                Move::Reveal(0),
                Move::Reveal(2),
                Move::Flag(3),
                Move::Reveal(4),
            ]
        );
        assert_eq!(board.visible(2), CellView::Revealed(2));
        assert!(board.cells().iter().all(|c| !(c.is_mine && c.is_revealed)));
    }

    #[test]
    fn test_121_reveals_inner_once_outers_flagged() {
        let mut board = horizontal_121();
        board.toggle_flag(1);
        board.toggle_flag(3);
        assert_eq!(one_two_one_move(&board), Some(Move::Reveal(2)));
    }

    #[test]
    fn test_resolved_121_falls_through() {
        let mut board = horizontal_121();
        for i in [1, 2, 3] {
            board.toggle_flag(i);
        }
        assert_eq!(one_two_one_move(&board), None);

        let mut s = solver(Difficulty::Hard);
        for _ in 0..20 {
            let Some(Move::Reveal(i)) = s.decide(&board) else {
                panic!("hard tier must still reveal");
            };
            assert!(i == 0 || i == 4, "revealed {}", i);
        }
    }

    #[test]
    fn test_hard_121_vertical() {
        // Same shape rotated: mines in column 0 at rows 1 and 3.
        let mut board = Board::with_mines(5, &[5, 15]);
        board.reveal(24);
        assert_eq!(counting_move(&board), None);
        assert_eq!(solver(Difficulty::Hard).decide(&board), Some(Move::Flag(5)));
    }

    #[test]
    fn test_121_needs_a_single_unopened_side() {
        let board = horizontal_121();
        assert_eq!(find_run(&board, 1, 1, Axis::Horizontal), Some([1, 2, 3]));
        assert_eq!(find_run(&board, 1, 0, Axis::Horizontal), None);

        // Both sides hidden: no deduction.
        let mut board = Board::with_mines(5, &[1, 3]);
        for i in 5..10 {
            board.reveal(i);
        }
        assert_eq!(find_run(&board, 1, 1, Axis::Horizontal), None);
    }

    #[test]
    fn test_play_goes_through_session_turns() {
        use crate::clock::ManualClock;
        use crate::config::SessionConfig;

        let clock = ManualClock::new();
        let mut session =
            GameSession::with_parts(Box::new(clock.clone()), GameRng::from_seed(21));
        session
            .start(SessionConfig::new(10, true, Difficulty::Easy))
            .unwrap();

        // The player moves first; an AI move is refused.
        let mut s = solver(Difficulty::Easy);
        assert!(matches!(s.play(&mut session), Some(MoveOutcome::Rejected(_))));
    }
}
