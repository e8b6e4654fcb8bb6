//! The authoritative trivia engine for Quizhall.
//!
//! All room state lives inside a single engine actor task; connection
//! handlers talk to it through an [`EngineHandle`]. Commands are
//! applied one at a time to completion, so room state never needs a
//! lock and a timer expiry can never interleave with a command.
//!
//! # Key types
//!
//! - [`EngineHandle`] — send commands to the running engine actor
//! - [`GameSession`] — the state machine itself (registry + router)
//! - [`RoomRegistry`] — rooms by code, participants by id
//! - [`SessionPhase`] — lobby / active / between / finished lifecycle
//! - [`EngineError`] — why a command was rejected

mod broadcast;
mod engine;
mod error;
mod ids;
mod registry;
mod room;
mod session;

pub use broadcast::{BroadcastRouter, EventSender};
pub use engine::{spawn_engine, EngineHandle};
pub use error::EngineError;
pub use ids::{generate_participant_id, generate_room_code};
pub use registry::RoomRegistry;
pub use room::{Room, SessionPhase};
pub use session::{GameSession, TimerRequest};
