//! Board state: mine placement, numbering, reveal and flag mutation.
//!
//! Mines are placed lazily on the first reveal so that the clicked cell and
//! its neighbors are always safe, which guarantees a real opening.

use crate::rng::GameRng;
use crate::types::{Cell, CellView, FlagResult, NeighborCache, RevealResult};

/// A square grid of cells plus its mine bookkeeping.
pub struct Board {
    side: usize,
    mine_count: usize,
    cells: Vec<Cell>,
    neighbors: NeighborCache,
    mines_placed: bool,
    /// The mine that ended the game, if any.
    exploded: Option<usize>,
    /// Set after a loss: unflagged mines render as `CellView::Mine`.
    mines_exposed: bool,
}

impl Board {
    /// Create an empty board. No mines are placed yet.
    pub fn new(side: usize, mine_count: usize) -> Self {
        Self {
            side,
            mine_count,
            cells: (0..side * side).map(Cell::new).collect(),
            neighbors: NeighborCache::new(side),
            mines_placed: false,
            exploded: None,
            mines_exposed: false,
        }
    }

    /// Build a board from a known mine layout and number it.
    ///
    /// Used to replay a recorded layout and to set up exact positions.
    pub fn with_mines(side: usize, mines: &[usize]) -> Self {
        let mut board = Self::new(side, 0);
        for &i in mines {
            if i < board.size() && !board.cells[i].is_mine {
                board.cells[i].is_mine = true;
                board.mine_count += 1;
            }
        }
        board.mines_placed = true;
        board.compute_numbers();
        board
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Up to 8 neighbor indices in nw, n, ne, w, e, sw, s, se order.
    #[inline(always)]
    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.neighbors.get(index)
    }

    /// Resolved cells for `neighbors(index)`.
    pub fn adjacent_cells(&self, index: usize) -> Vec<&Cell> {
        self.neighbors(index).iter().map(|&n| &self.cells[n]).collect()
    }

    /// All cells neither revealed nor flagged, in index order.
    pub fn available_cells(&self) -> Vec<&Cell> {
        self.cells.iter().filter(|c| c.is_hidden()).collect()
    }

    /// Place this board's mines around a first click and number the board.
    pub fn place_mines_around(&mut self, first: usize, rng: &mut GameRng) {
        let excluded = self.neighbors(first).to_vec();
        self.place_mines(first, &excluded, self.mine_count, rng);
        self.compute_numbers();
    }

    /// Randomly place `count` mines, skipping `excluded_index` and every
    /// cell in `excluded`.
    ///
    /// The caller guarantees `count <= size - 1 - excluded.len()`; config
    /// validation makes any other count unreachable.
    pub fn place_mines(
        &mut self,
        excluded_index: usize,
        excluded: &[usize],
        count: usize,
        rng: &mut GameRng,
    ) {
        let n = self.size();
        debug_assert!(count + 1 + excluded.len() <= n, "not enough cells for {} mines", count);

        for cell in &mut self.cells {
            cell.is_mine = false;
            cell.adjacent_mines = 0;
        }

        let mut placed = 0;
        while placed < count {
            let i = rng.gen_index(n);
            if i == excluded_index || excluded.contains(&i) || self.cells[i].is_mine {
                continue;
            }
            self.cells[i].is_mine = true;
            placed += 1;
        }
        self.mine_count = count;
        self.mines_placed = true;
    }

    /// Set the neighbor mine count of every non-mine cell.
    /// Mine cells keep 0; their count is never read.
    pub fn compute_numbers(&mut self) {
        for i in 0..self.size() {
            if self.cells[i].is_mine {
                continue;
            }
            let count = self
                .neighbors
                .get(i)
                .iter()
                .filter(|&&n| self.cells[n].is_mine)
                .count();
            self.cells[i].adjacent_mines = count as u8;
        }
    }

    /// Reveal a cell, flood-filling through zero cells.
    ///
    /// No-op on revealed or flagged cells. Flood fill never opens a flagged
    /// cell or a mine and visits each cell at most once.
    pub fn reveal(&mut self, index: usize) -> RevealResult {
        debug_assert!(self.mines_placed, "reveal before mine placement");
        let Some(cell) = self.cells.get(index) else {
            return RevealResult::default();
        };
        if cell.is_revealed || cell.is_flagged {
            return RevealResult::default();
        }
        if cell.is_mine {
            self.cells[index].is_revealed = true;
            self.exploded = Some(index);
            return RevealResult {
                hit_mine: true,
                revealed: vec![index],
            };
        }

        let mut revealed = Vec::new();
        let mut stack = vec![index];

        while let Some(i) = stack.pop() {
            let cell = &mut self.cells[i];
            if cell.is_revealed || cell.is_flagged || cell.is_mine {
                continue;
            }
            cell.is_revealed = true;
            revealed.push(i);

            if cell.adjacent_mines == 0 {
                for &n in self.neighbors.get(i) {
                    let neighbor = &self.cells[n];
                    if neighbor.is_hidden() && !neighbor.is_mine {
                        stack.push(n);
                    }
                }
            }
        }

        RevealResult {
            hit_mine: false,
            revealed,
        }
    }

    /// Flip the flag on an unrevealed cell.
    pub fn toggle_flag(&mut self, index: usize) -> FlagResult {
        match self.cells.get_mut(index) {
            Some(cell) if !cell.is_revealed => {
                cell.is_flagged = !cell.is_flagged;
                FlagResult {
                    changed: true,
                    now_flagged: cell.is_flagged,
                }
            }
            Some(cell) => FlagResult {
                changed: false,
                now_flagged: cell.is_flagged,
            },
            None => FlagResult {
                changed: false,
                now_flagged: false,
            },
        }
    }

    /// A game is won once every mine carries a flag, whether or not the
    /// safe cells have been opened.
    pub fn is_winning_state(&self, correctly_flagged: usize) -> bool {
        correctly_flagged == self.mine_count
    }

    /// Number of flags currently on the board.
    pub fn flag_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_flagged).count()
    }

    /// Mine counter shown to the player; negative when over-flagged.
    pub fn remaining_mines(&self) -> isize {
        self.mine_count as isize - self.flag_count() as isize
    }

    /// Show every unflagged mine. Called once the game is lost.
    /// Returns the indices whose view changed.
    pub fn expose_mines(&mut self) -> Vec<usize> {
        self.mines_exposed = true;
        self.cells
            .iter()
            .filter(|c| c.is_mine && !c.is_flagged && Some(c.index) != self.exploded)
            .map(|c| c.index)
            .collect()
    }

    /// What a player can see at `index`.
    pub fn visible(&self, index: usize) -> CellView {
        let cell = &self.cells[index];
        if cell.is_flagged {
            CellView::Flagged
        } else if cell.is_mine && self.exploded == Some(index) {
            CellView::Exploded
        } else if cell.is_mine && (cell.is_revealed || self.mines_exposed) {
            CellView::Mine
        } else if cell.is_revealed {
            CellView::Revealed(cell.adjacent_mines)
        } else {
            CellView::Hidden
        }
    }
}
