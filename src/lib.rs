//! Minesweeper engine with a rule-based AI opponent, for the browser.
//!
//! The core (board, session state machine, solver) is plain Rust and is
//! tested natively. The page drives it through the `Minesweeper` class
//! exported by wasm-bindgen. Cells are numbered row-major:
//! `index = row * side + col`.

pub mod board;
pub mod clock;
pub mod config;
pub mod events;
#[cfg(target_arch = "wasm32")]
pub mod logging;
pub mod rng;
pub mod session;
pub mod solver;
pub mod types;

pub use board::Board;
pub use config::{ConfigError, SessionConfig};
pub use events::GameEvent;
pub use session::{AiTurnTicket, GameSession, MoveOutcome, MoveRejection};
pub use solver::Solver;
pub use types::{Actor, CellView, Difficulty, EndCondition, Move, SessionState};

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use log::LevelFilter;
    use wasm_bindgen::prelude::*;

    use crate::clock::Clock;
    use crate::logging;
    use crate::rng::GameRng;
    use crate::session::{AiTurnTicket, GameSession, MoveOutcome};
    use crate::solver::Solver;
    use crate::types::{Actor, Difficulty, EndCondition, SessionState};
    use crate::SessionConfig;

    /// `Date.now()`; `std::time::Instant` panics on wasm32-unknown-unknown.
    struct JsClock;

    impl Clock for JsClock {
        fn now_ms(&self) -> u64 {
            js_sys::Date::now() as u64
        }
    }

    fn outcome_name(outcome: MoveOutcome) -> String {
        match outcome {
            MoveOutcome::Applied => "applied",
            MoveOutcome::Ended(EndCondition::Win) => "win",
            MoveOutcome::Ended(EndCondition::Lose) => "lose",
            MoveOutcome::Rejected(_) => "rejected",
        }
        .to_string()
    }

    impl Default for WasmGame {
        fn default() -> Self {
            Self::new()
        }
    }

    /// One game session plus its AI player.
    #[wasm_bindgen(js_name = "Minesweeper")]
    pub struct WasmGame {
        session: GameSession,
        solver: Solver,
    }

    #[wasm_bindgen(js_class = "Minesweeper")]
    impl WasmGame {
        #[wasm_bindgen(constructor)]
        pub fn new() -> WasmGame {
            logging::init(LevelFilter::Info);
            WasmGame {
                session: GameSession::with_parts(Box::new(JsClock), GameRng::new()),
                solver: Solver::new(Difficulty::None),
            }
        }

        /// Start a game from `{ mineCount, boardSide, aiOpponent, aiDifficulty }`.
        /// Throws the validation message for an out-of-range config.
        pub fn start(&mut self, config: JsValue) -> Result<(), JsValue> {
            let config: SessionConfig = serde_wasm_bindgen::from_value(config)?;
            let difficulty = config.ai_difficulty;
            self.session
                .start(config)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            self.solver.set_difficulty(difficulty);
            Ok(())
        }

        /// Player reveal. Returns "applied", "win", "lose" or "rejected".
        pub fn reveal(&mut self, index: usize) -> String {
            outcome_name(self.session.request_reveal(index, Actor::Player))
        }

        #[wasm_bindgen(js_name = "toggleFlag")]
        pub fn toggle_flag(&mut self, index: usize) -> String {
            outcome_name(self.session.request_flag_toggle(index, Actor::Player))
        }

        /// Run the AI turn armed by an `aiTurnScheduled` event.
        /// Returns `undefined` for a stale ticket or when the AI passes.
        #[wasm_bindgen(js_name = "runAiTurn")]
        pub fn run_ai_turn(&mut self, ticket: JsValue) -> Result<Option<String>, JsValue> {
            let ticket: AiTurnTicket = serde_wasm_bindgen::from_value(ticket)?;
            Ok(self
                .session
                .run_ai_turn(ticket, &mut self.solver)
                .map(outcome_name))
        }

        /// Queue a `timerTick` event if the displayed seconds changed.
        pub fn tick(&mut self) -> bool {
            self.session.tick().is_some()
        }

        /// Switch to "mainMenu", "options" or "credits".
        pub fn navigate(&mut self, page: JsValue) -> Result<bool, JsValue> {
            let page: SessionState = serde_wasm_bindgen::from_value(page)?;
            Ok(self.session.navigate(page))
        }

        /// Visible board: -1 hidden, -2 flagged, 0-8 number, 9 mine, 10 exploded.
        pub fn cells(&self) -> js_sys::Int8Array {
            let board = self.session.board();
            let codes: Vec<i8> = (0..board.size()).map(|i| board.visible(i).code()).collect();
            let arr = js_sys::Int8Array::new_with_length(codes.len() as u32);
            arr.copy_from(&codes);
            arr
        }

        /// Every event queued since the last call, as plain JS objects.
        #[wasm_bindgen(js_name = "drainEvents")]
        pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
            let events = self.session.drain_events();
            Ok(serde_wasm_bindgen::to_value(&events)?)
        }

        /// "mainMenu", "activeGame", "gameOver", "options" or "credits".
        #[wasm_bindgen(getter)]
        pub fn state(&self) -> JsValue {
            serde_wasm_bindgen::to_value(&self.session.state()).unwrap_or(JsValue::NULL)
        }

        /// "player" or "ai".
        #[wasm_bindgen(getter)]
        pub fn turn(&self) -> JsValue {
            serde_wasm_bindgen::to_value(&self.session.turn()).unwrap_or(JsValue::NULL)
        }

        #[wasm_bindgen(getter)]
        pub fn side(&self) -> usize {
            self.session.board().side()
        }

        #[wasm_bindgen(getter, js_name = "remainingMines")]
        pub fn remaining_mines(&self) -> i32 {
            self.session.board().remaining_mines() as i32
        }

        #[wasm_bindgen(getter, js_name = "elapsedSeconds")]
        pub fn elapsed_seconds(&self) -> u32 {
            self.session.elapsed_secs() as u32
        }
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "Minesweeper engine ready".to_string()
    }
}
