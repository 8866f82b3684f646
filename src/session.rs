//! Game session: state machine, turn alternation, timing and bookkeeping.
//!
//! The session owns its `Board` and is the only entry point for moves.
//! Every move is validated against the session state and, when an AI
//! opponent is configured, against whose turn it is. Invalid moves never
//! mutate anything; they come back as `MoveOutcome::Rejected` and are
//! logged at debug level.
//!
//! The AI's turn is deferred: when the turn passes to the AI the session
//! records an `AiTurnTicket` and emits `GameEvent::AiTurnScheduled`. The
//! host runs the ticket later with `run_ai_turn` (timer hosts) or
//! `poll_ai_turn` (polling hosts). Tickets are re-validated when they run,
//! and any restart, game end or navigation away from the game drops them.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Board;
#[cfg(not(target_arch = "wasm32"))]
use crate::clock::MonotonicClock;
use crate::clock::Clock;
use crate::config::{ConfigError, SessionConfig};
use crate::events::GameEvent;
use crate::rng::GameRng;
use crate::solver::Solver;
use crate::types::{Actor, CellView, EndCondition, SessionState, AI_TURN_DELAY_MS};

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("no game in progress")]
    NotActive,
    #[error("not the {0:?}'s turn")]
    WrongTurn(Actor),
    #[error("cell {0} is outside the board")]
    OutOfBounds(usize),
    #[error("cell {0} is already revealed")]
    AlreadyRevealed(usize),
    #[error("cell {0} is flagged")]
    Flagged(usize),
    #[error("flags can only be placed after the first reveal")]
    BeforeFirstReveal,
}

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Applied,
    Ended(EndCondition),
    Rejected(MoveRejection),
}

/// Handle for one deferred AI turn.
///
/// Serializable so a browser host can hand the ticket it armed a timer with
/// back to `run_ai_turn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiTurnTicket {
    epoch: u64,
    seq: u64,
    pub due_at_ms: u64,
}

pub struct GameSession {
    board: Board,
    config: SessionConfig,
    state: SessionState,
    first_click_done: bool,
    flagged: Vec<usize>,
    user_flag_count: usize,
    correctly_flagged: usize,
    started_at_ms: Option<u64>,
    final_elapsed_ms: Option<u64>,
    last_tick_secs: u64,
    turn: Actor,
    alternate_turns: bool,
    /// Bumped by every `start`; tickets from older games never match.
    epoch: u64,
    ticket_seq: u64,
    pending_ai_turn: Option<AiTurnTicket>,
    outcome: Option<EndCondition>,
    events: Vec<GameEvent>,
    rng: GameRng,
    clock: Box<dyn Clock>,
}

impl GameSession {
    /// Session on the native monotonic clock with an OS-seeded RNG.
    /// Not available on wasm32, where hosts pass a clock to `with_parts`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self::with_parts(Box::new(MonotonicClock::new()), GameRng::new())
    }

    pub fn with_parts(clock: Box<dyn Clock>, rng: GameRng) -> Self {
        let config = SessionConfig::default();
        Self {
            board: Board::new(config.board_side, config.mine_count),
            config,
            state: SessionState::MainMenu,
            first_click_done: false,
            flagged: Vec::new(),
            user_flag_count: 0,
            correctly_flagged: 0,
            started_at_ms: None,
            final_elapsed_ms: None,
            last_tick_secs: 0,
            turn: Actor::Player,
            alternate_turns: false,
            epoch: 0,
            ticket_seq: 0,
            pending_ai_turn: None,
            outcome: None,
            events: Vec::new(),
            rng,
            clock,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn turn(&self) -> Actor {
        self.turn
    }

    pub fn alternates_turns(&self) -> bool {
        self.alternate_turns
    }

    pub fn first_click_done(&self) -> bool {
        self.first_click_done
    }

    /// Flagged cells in the order they were flagged.
    pub fn flagged_cells(&self) -> &[usize] {
        &self.flagged
    }

    pub fn user_flag_count(&self) -> usize {
        self.user_flag_count
    }

    pub fn correctly_flagged(&self) -> usize {
        self.correctly_flagged
    }

    pub fn outcome(&self) -> Option<EndCondition> {
        self.outcome
    }

    pub fn pending_ai_turn(&self) -> Option<AiTurnTicket> {
        self.pending_ai_turn
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Milliseconds since the first reveal, frozen once the game ends.
    pub fn elapsed_ms(&self) -> u64 {
        if let Some(ms) = self.final_elapsed_ms {
            return ms;
        }
        match self.started_at_ms {
            Some(start) => self.clock.now_ms().saturating_sub(start),
            None => 0,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_ms() / 1000
    }

    /// Start a fresh game. An invalid config leaves the session untouched.
    pub fn start(&mut self, config: SessionConfig) -> Result<(), ConfigError> {
        if let Err(err) = config.validate() {
            warn!("refusing to start: {}", err);
            self.events.push(GameEvent::status(err.to_string()));
            return Err(err);
        }

        self.board = Board::new(config.board_side, config.mine_count);
        self.first_click_done = false;
        self.flagged.clear();
        self.user_flag_count = 0;
        self.correctly_flagged = 0;
        self.started_at_ms = None;
        self.final_elapsed_ms = None;
        self.last_tick_secs = 0;
        self.turn = Actor::Player;
        self.alternate_turns = config.alternates_turns();
        self.epoch += 1;
        self.pending_ai_turn = None;
        self.outcome = None;
        self.state = SessionState::ActiveGame;

        let ai_enabled = if config.ai_opponent { "enabled" } else { "disabled" };
        info!(
            "game {} started: {} bombs on {}x{}, AI {} ({})",
            self.epoch,
            config.mine_count,
            config.board_side,
            config.board_side,
            ai_enabled,
            config.ai_difficulty.name()
        );
        self.events.push(GameEvent::status(format!(
            "There will be {} bombs. The AI bot is {} (difficulty: {}). The game is now in progress, good luck!",
            config.mine_count,
            ai_enabled,
            config.ai_difficulty.name()
        )));
        self.config = config;
        Ok(())
    }

    /// Reveal a cell on behalf of `actor`.
    ///
    /// The first accepted reveal places the mines around the clicked cell
    /// and starts the timer.
    pub fn request_reveal(&mut self, index: usize, actor: Actor) -> MoveOutcome {
        if let Err(reason) = self.check_move(index, actor) {
            return self.reject(reason, actor);
        }
        let cell = self.board.cells()[index];
        if cell.is_revealed {
            return self.reject(MoveRejection::AlreadyRevealed(index), actor);
        }
        if cell.is_flagged {
            return self.reject(MoveRejection::Flagged(index), actor);
        }

        if !self.first_click_done {
            self.board.place_mines_around(index, &mut self.rng);
            self.first_click_done = true;
            self.started_at_ms = Some(self.clock.now_ms());
            debug!("mines placed around first click {}", index);
        }

        let result = self.board.reveal(index);
        for &i in &result.revealed {
            self.events.push(GameEvent::CellChanged {
                index: i,
                view: self.board.visible(i),
            });
        }

        if result.hit_mine {
            self.end_game(EndCondition::Lose, actor);
            return MoveOutcome::Ended(EndCondition::Lose);
        }
        if self.board.is_winning_state(self.correctly_flagged) {
            self.end_game(EndCondition::Win, actor);
            return MoveOutcome::Ended(EndCondition::Win);
        }
        self.switch_turn();
        MoveOutcome::Applied
    }

    /// Toggle the flag on a cell on behalf of `actor`.
    pub fn request_flag_toggle(&mut self, index: usize, actor: Actor) -> MoveOutcome {
        if let Err(reason) = self.check_move(index, actor) {
            return self.reject(reason, actor);
        }
        if !self.first_click_done {
            return self.reject(MoveRejection::BeforeFirstReveal, actor);
        }
        if self.board.cells()[index].is_revealed {
            return self.reject(MoveRejection::AlreadyRevealed(index), actor);
        }

        let result = self.board.toggle_flag(index);
        let is_mine = self.board.cells()[index].is_mine;
        if result.now_flagged {
            self.flagged.push(index);
            self.user_flag_count += 1;
            if is_mine {
                self.correctly_flagged += 1;
            }
        } else {
            self.flagged.retain(|&i| i != index);
            self.user_flag_count = self.user_flag_count.saturating_sub(1);
            if is_mine {
                self.correctly_flagged = self.correctly_flagged.saturating_sub(1);
            }
        }

        self.events.push(GameEvent::CellChanged {
            index,
            view: self.board.visible(index),
        });
        self.events.push(GameEvent::status(format!(
            "Bombs remaining: {}",
            self.board.remaining_mines()
        )));

        if self.board.is_winning_state(self.correctly_flagged) {
            self.end_game(EndCondition::Win, actor);
            return MoveOutcome::Ended(EndCondition::Win);
        }
        self.switch_turn();
        MoveOutcome::Applied
    }

    /// Hand the turn to the other actor. No-op in single-player mode.
    ///
    /// When the turn passes to the AI a ticket is scheduled
    /// `AI_TURN_DELAY_MS` from now.
    pub fn switch_turn(&mut self) {
        if !self.alternate_turns {
            return;
        }
        self.turn = self.turn.other();
        match self.turn {
            Actor::Ai => {
                self.ticket_seq += 1;
                let ticket = AiTurnTicket {
                    epoch: self.epoch,
                    seq: self.ticket_seq,
                    due_at_ms: self.clock.now_ms() + AI_TURN_DELAY_MS,
                };
                self.pending_ai_turn = Some(ticket);
                debug!("AI turn {} scheduled for {}ms", ticket.seq, ticket.due_at_ms);
                self.events.push(GameEvent::AiTurnScheduled {
                    delay_ms: AI_TURN_DELAY_MS,
                    ticket,
                });
                self.events.push(GameEvent::status("The AI is thinking..."));
            }
            Actor::Player => {
                self.events.push(GameEvent::status("Your turn."));
            }
        }
    }

    /// Execute a scheduled AI turn.
    ///
    /// Returns `None` when the ticket is stale (restart, game over,
    /// navigation) or the AI has nothing left to do. In the latter case the
    /// turn goes back to the player.
    pub fn run_ai_turn(&mut self, ticket: AiTurnTicket, solver: &mut Solver) -> Option<MoveOutcome> {
        if self.pending_ai_turn != Some(ticket) {
            debug!("stale AI turn {} (game {}) ignored", ticket.seq, ticket.epoch);
            return None;
        }
        self.pending_ai_turn = None;
        if self.state != SessionState::ActiveGame
            || !self.alternate_turns
            || self.turn != Actor::Ai
        {
            return None;
        }

        let outcome = solver.play(self);
        if outcome.is_none() {
            debug!("AI has no moves, passing");
            self.switch_turn();
        }
        outcome
    }

    /// Run the pending AI turn once its delay has elapsed.
    pub fn poll_ai_turn(&mut self, solver: &mut Solver) -> Option<MoveOutcome> {
        let ticket = self.pending_ai_turn?;
        if self.clock.now_ms() < ticket.due_at_ms {
            return None;
        }
        self.run_ai_turn(ticket, solver)
    }

    /// Emit a `TimerTick` when the elapsed whole seconds changed.
    pub fn tick(&mut self) -> Option<u64> {
        if self.state != SessionState::ActiveGame || self.started_at_ms.is_none() {
            return None;
        }
        let secs = self.elapsed_secs();
        if secs == self.last_tick_secs {
            return None;
        }
        self.last_tick_secs = secs;
        self.events.push(GameEvent::TimerTick { seconds: secs });
        Some(secs)
    }

    /// Switch to a menu page. Leaving an active game abandons it.
    /// `ActiveGame` and `GameOver` are only entered through play.
    pub fn navigate(&mut self, target: SessionState) -> bool {
        if matches!(target, SessionState::ActiveGame | SessionState::GameOver) {
            debug!("cannot navigate to {:?}", target);
            return false;
        }
        if self.state == SessionState::ActiveGame {
            info!("game {} abandoned", self.epoch);
            self.pending_ai_turn = None;
        }
        self.state = target;
        true
    }

    fn check_move(&self, index: usize, actor: Actor) -> Result<(), MoveRejection> {
        if self.state != SessionState::ActiveGame {
            return Err(MoveRejection::NotActive);
        }
        if index >= self.board.size() {
            return Err(MoveRejection::OutOfBounds(index));
        }
        if self.alternate_turns && actor != self.turn {
            return Err(MoveRejection::WrongTurn(actor));
        }
        Ok(())
    }

    fn reject(&self, reason: MoveRejection, actor: Actor) -> MoveOutcome {
        debug!("{:?} move rejected: {}", actor, reason);
        MoveOutcome::Rejected(reason)
    }

    fn end_game(&mut self, condition: EndCondition, by: Actor) {
        self.state = SessionState::GameOver;
        self.pending_ai_turn = None;
        self.outcome = Some(condition);
        self.final_elapsed_ms = Some(self.elapsed_ms());
        let seconds = self.elapsed_secs();

        let message = match condition {
            EndCondition::Lose => {
                for i in self.board.expose_mines() {
                    self.events.push(GameEvent::CellChanged {
                        index: i,
                        view: CellView::Mine,
                    });
                }
                if self.alternate_turns && by == Actor::Ai {
                    format!("GAME OVER! The AI hit a bomb! Time: {}s", seconds)
                } else {
                    format!("GAME OVER! You hit a bomb! Time: {}s", seconds)
                }
            }
            EndCondition::Win => {
                if self.alternate_turns && by == Actor::Ai {
                    format!("The AI flagged the last bomb. Time: {}s", seconds)
                } else {
                    format!("CONGRATULATIONS! YOU WIN! Time: {}s", seconds)
                }
            }
        };

        info!("game {} over: {:?} by {:?} after {}s", self.epoch, condition, by, seconds);
        self.events.push(GameEvent::status(message));
        self.events.push(GameEvent::GameEnded {
            condition,
            by,
            seconds,
        });
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
