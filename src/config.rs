//! Session configuration handed over by the page when a game starts.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{
    Difficulty, DEFAULT_BOARD_SIDE, MAX_BOARD_SIDE, MAX_BOMBS, MIN_BOARD_SIDE, MIN_BOMBS,
};

/// Cells that can never hold a mine: the first click and its 8 neighbors.
const OPENING_CELLS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Please select a bomb value between {min} and {max} (got {got}).")]
    MineCount { got: usize, min: usize, max: usize },
    #[error("Board side must be between {min} and {max} (got {got}).")]
    BoardSide { got: usize, min: usize, max: usize },
    #[error("{mines} bombs do not fit on a {side}x{side} board with a safe opening.")]
    TooManyMines { mines: usize, side: usize },
}

/// Inputs consumed at session start.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub mine_count: usize,
    pub board_side: usize,
    pub ai_opponent: bool,
    pub ai_difficulty: Difficulty,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mine_count: MIN_BOMBS,
            board_side: DEFAULT_BOARD_SIDE,
            ai_opponent: false,
            ai_difficulty: Difficulty::None,
        }
    }
}

impl SessionConfig {
    pub fn new(mine_count: usize, ai_opponent: bool, ai_difficulty: Difficulty) -> Self {
        Self {
            mine_count,
            ai_opponent,
            ai_difficulty,
            ..Self::default()
        }
    }

    pub fn with_board_side(mut self, side: usize) -> Self {
        self.board_side = side;
        self
    }

    /// Check every bound a game relies on. Mine placement loops until the
    /// requested count is placed, so this is what keeps it finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BOMBS..=MAX_BOMBS).contains(&self.mine_count) {
            return Err(ConfigError::MineCount {
                got: self.mine_count,
                min: MIN_BOMBS,
                max: MAX_BOMBS,
            });
        }
        if !(MIN_BOARD_SIDE..=MAX_BOARD_SIDE).contains(&self.board_side) {
            return Err(ConfigError::BoardSide {
                got: self.board_side,
                min: MIN_BOARD_SIDE,
                max: MAX_BOARD_SIDE,
            });
        }
        let placeable = self.board_side * self.board_side - OPENING_CELLS;
        if self.mine_count > placeable {
            return Err(ConfigError::TooManyMines {
                mines: self.mine_count,
                side: self.board_side,
            });
        }
        Ok(())
    }

    /// Player and AI alternate only when an AI opponent with a real tier is
    /// configured.
    pub fn alternates_turns(&self) -> bool {
        self.ai_opponent && self.ai_difficulty != Difficulty::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.mine_count, 10);
        assert_eq!(cfg.board_side, 10);
        assert!(cfg.validate().is_ok());
        assert!(!cfg.alternates_turns());
    }

    #[test]
    fn test_mine_count_bounds() {
        assert!(SessionConfig::new(10, false, Difficulty::None).validate().is_ok());
        assert!(SessionConfig::new(20, false, Difficulty::None).validate().is_ok());
        assert_eq!(
            SessionConfig::new(9, false, Difficulty::None).validate(),
            Err(ConfigError::MineCount { got: 9, min: 10, max: 20 })
        );
        assert!(matches!(
            SessionConfig::new(21, false, Difficulty::None).validate(),
            Err(ConfigError::MineCount { got: 21, .. })
        ));
    }

    #[test]
    fn test_board_side_bounds() {
        let cfg = SessionConfig::default().with_board_side(5);
        assert!(matches!(cfg.validate(), Err(ConfigError::BoardSide { got: 5, .. })));
        let cfg = SessionConfig::default().with_board_side(31);
        assert!(matches!(cfg.validate(), Err(ConfigError::BoardSide { got: 31, .. })));
        let cfg = SessionConfig::new(20, false, Difficulty::None).with_board_side(6);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_alternation_needs_opponent_and_tier() {
        assert!(SessionConfig::new(10, true, Difficulty::Easy).alternates_turns());
        assert!(!SessionConfig::new(10, true, Difficulty::None).alternates_turns());
        assert!(!SessionConfig::new(10, false, Difficulty::Hard).alternates_turns());
    }

    #[test]
    fn test_error_message_names_bounds() {
        let err = SessionConfig::new(3, false, Difficulty::None).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please select a bomb value between 10 and 20 (got 3)."
        );
    }
}
