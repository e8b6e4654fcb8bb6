//! Wire protocol for Quizhall.
//!
//! This crate defines the language that trivia clients and the server
//! speak:
//!
//! - **Types** ([`ClientCommand`], [`ServerEvent`], room/question/answer
//!   records) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about connections, rooms, or game
//! rules — it sits between the transport (raw frames) and the engine
//! (authoritative state):
//!
//! ```text
//! Transport (bytes) → Protocol (commands/events) → Engine (rooms)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Answer, AnswerSummary, ClientCommand, Participant, ParticipantId, Question,
    QuestionDraft, QuestionId, QuestionKind, RoomCode, RoomId, RoomSnapshot,
    ServerEvent,
};
