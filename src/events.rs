//! Events emitted by a session for the page to render.
//!
//! Serialized with a `type` tag so the JS side can switch on
//! `event.type` after `serde-wasm-bindgen` conversion.

use serde::Serialize;

use crate::session::AiTurnTicket;
use crate::types::{Actor, CellView, EndCondition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    /// A cell's visible state changed.
    #[serde(rename_all = "camelCase")]
    CellChanged { index: usize, view: CellView },
    /// Free text for the status line.
    Status { message: String },
    /// Whole seconds since the first reveal.
    TimerTick { seconds: u64 },
    /// The AI will act after `delay_ms`; the host should arm a timer and
    /// pass `ticket` back when it fires.
    #[serde(rename_all = "camelCase")]
    AiTurnScheduled { delay_ms: u64, ticket: AiTurnTicket },
    /// The game is over. `by` is the actor whose move ended it.
    GameEnded {
        condition: EndCondition,
        by: Actor,
        seconds: u64,
    },
}

impl GameEvent {
    pub fn status(message: impl Into<String>) -> Self {
        GameEvent::Status {
            message: message.into(),
        }
    }
}
