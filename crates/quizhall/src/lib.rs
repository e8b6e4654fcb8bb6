//! # Quizhall
//!
//! Real-time multiplayer trivia server over WebSockets.
//!
//! A moderator creates a room and gets a 4-character code; players
//! join with the code and a nickname. The moderator authors questions,
//! starts them one at a time, and every answer is scored by the server
//! — the authoritative state never leaves the engine.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizhall::QuizServer;
//!
//! # async fn run() -> Result<(), quizhall::QuizhallError> {
//! let server = QuizServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::QuizhallError;
pub use server::{QuizServer, QuizServerBuilder};

pub use quizhall_engine::{EngineError, EngineHandle};
pub use quizhall_protocol::{
    Answer, AnswerSummary, ClientCommand, Participant, ParticipantId,
    Question, QuestionDraft, QuestionKind, RoomCode, RoomSnapshot,
    ServerEvent,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the tracing subscriber for a server binary.
///
/// The default level applies to this crate's targets; the `RUST_LOG`
/// environment variable overrides everything.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                |_| {
                    format!(
                        "quizhall={default_level},quizhall_engine={default_level},quizhall_transport={default_level}"
                    )
                    .into()
                },
            ),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
