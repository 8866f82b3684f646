//! Core data types shared by the board, the session and the solver.
//!
//! All per-cell storage is a flat `Vec` in row-major layout:
//! `cells[row * side + col]`, matching the tile numbering of the page.

use serde::{Deserialize, Serialize};

/// Minimum number of bombs a game may be started with.
pub const MIN_BOMBS: usize = 10;
/// Maximum number of bombs a game may be started with.
pub const MAX_BOMBS: usize = 20;

/// Board side used when the host does not pick one.
pub const DEFAULT_BOARD_SIDE: usize = 10;
pub const MIN_BOARD_SIDE: usize = 6;
pub const MAX_BOARD_SIDE: usize = 30;

/// Delay between the turn passing to the AI and the AI acting.
pub const AI_TURN_DELAY_MS: u64 = 1000;

/// One board position.
///
/// `adjacent_mines` is only meaningful once mines are placed, and only for
/// cells that are not mines themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub index: usize,
    pub is_mine: bool,
    pub adjacent_mines: u8,
    pub is_revealed: bool,
    pub is_flagged: bool,
}

impl Cell {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            is_mine: false,
            adjacent_mines: 0,
            is_revealed: false,
            is_flagged: false,
        }
    }

    /// Neither revealed nor flagged.
    #[inline(always)]
    pub fn is_hidden(&self) -> bool {
        !self.is_revealed && !self.is_flagged
    }
}

/// What a player is allowed to know about a cell.
///
/// This is the projection rendered by the page and the only view the
/// solver reads. `Mine` is an unflagged mine exposed after a loss and
/// `Exploded` the mine that ended the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
    Exploded,
}

impl CellView {
    /// Compact encoding for the `Int8Array` handed to JS:
    /// -1 hidden, -2 flagged, 0-8 revealed number, 9 mine, 10 exploded.
    pub fn code(self) -> i8 {
        match self {
            CellView::Hidden => -1,
            CellView::Flagged => -2,
            CellView::Revealed(n) => n as i8,
            CellView::Mine => 9,
            CellView::Exploded => 10,
        }
    }
}

/// Who issues a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Actor {
    Player,
    Ai,
}

impl Actor {
    pub fn other(self) -> Actor {
        match self {
            Actor::Player => Actor::Ai,
            Actor::Ai => Actor::Player,
        }
    }
}

/// AI skill tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    #[default]
    None,
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::None => "none",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Top-level page/session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    MainMenu,
    ActiveGame,
    GameOver,
    Options,
    Credits,
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EndCondition {
    Win,
    Lose,
}

/// Result of revealing one cell, including every cell opened by flood fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealResult {
    pub hit_mine: bool,
    pub revealed: Vec<usize>,
}

/// Result of toggling a flag. `changed` is false when the cell was revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagResult {
    pub changed: bool,
    pub now_flagged: bool,
}

/// A single move chosen by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Reveal(usize),
    Flag(usize),
}

/// Pre-computed neighbor table for a square board.
///
/// Stores the 8-directional neighbors (clipped to the board, no row
/// wrap-around) for every cell, in the order
/// nw, n, ne, w, e, sw, s, se.
pub struct NeighborCache {
    /// Flat storage of all neighbor indices.
    data: Vec<usize>,
    /// offsets[i] = start index in `data` for cell i.
    /// offsets[i+1] - offsets[i] = number of neighbors for cell i.
    offsets: Vec<usize>,
}

impl NeighborCache {
    /// Build the neighbor cache for a `side` x `side` board.
    pub fn new(side: usize) -> Self {
        let total = side * side;
        let mut data = Vec::with_capacity(total * 8);
        let mut offsets = Vec::with_capacity(total + 1);

        for row in 0..side {
            for col in 0..side {
                offsets.push(data.len());
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nr = row as i32 + dy;
                        let nc = col as i32 + dx;
                        if nr >= 0 && nr < side as i32 && nc >= 0 && nc < side as i32 {
                            data.push(nr as usize * side + nc as usize);
                        }
                    }
                }
            }
        }
        offsets.push(data.len()); // sentinel

        Self { data, offsets }
    }

    /// Get the pre-computed neighbors for cell `index`.
    #[inline(always)]
    pub fn get(&self, index: usize) -> &[usize] {
        let start = self.offsets[index];
        let end = self.offsets[index + 1];
        &self.data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_cache_corners_edges_interior() {
        let nc = NeighborCache::new(5);
        // Corners
        assert_eq!(nc.get(0).len(), 3);
        assert_eq!(nc.get(4).len(), 3);
        assert_eq!(nc.get(20).len(), 3);
        assert_eq!(nc.get(24).len(), 3);
        // Edges
        assert_eq!(nc.get(2).len(), 5);
        assert_eq!(nc.get(10).len(), 5);
        assert_eq!(nc.get(14).len(), 5);
        // Interior
        assert_eq!(nc.get(12).len(), 8);
    }

    #[test]
    fn test_neighbor_cache_no_row_wrap() {
        let nc = NeighborCache::new(10);
        // Column 0 never sees column 9 of the previous/next row.
        for &n in nc.get(10) {
            assert_ne!(n % 10, 9);
        }
        for &n in nc.get(19) {
            assert_ne!(n % 10, 0);
        }
    }

    #[test]
    fn test_neighbor_order() {
        let nc = NeighborCache::new(10);
        assert_eq!(nc.get(11), &[0, 1, 2, 10, 12, 20, 21, 22]);
        assert_eq!(nc.get(0), &[1, 10, 11]);
    }

    #[test]
    fn test_neighbor_symmetry() {
        for side in [6, 7, 10] {
            let nc = NeighborCache::new(side);
            for i in 0..side * side {
                for &j in nc.get(i) {
                    assert!(nc.get(j).contains(&i), "{} -> {} not symmetric", i, j);
                }
            }
        }
    }

    #[test]
    fn test_cell_view_codes() {
        assert_eq!(CellView::Hidden.code(), -1);
        assert_eq!(CellView::Flagged.code(), -2);
        assert_eq!(CellView::Revealed(3).code(), 3);
        assert_eq!(CellView::Mine.code(), 9);
        assert_eq!(CellView::Exploded.code(), 10);
    }
}
