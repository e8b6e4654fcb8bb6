//! Error types for the engine.

use quizhall_protocol::RoomCode;

/// Errors produced by registry and session operations.
///
/// Every variant is recovered at the command boundary: the offending
/// caller gets a uniform `error` event carrying the message below and
/// room state is left untouched. The messages are user-facing.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No room with this code exists (or it was torn down).
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The caller is not in any room.
    #[error("you are not in a room")]
    NotInRoom,

    /// The caller is already in a room; a participant can be in at
    /// most one room at a time.
    #[error("you are already in a room")]
    AlreadyInRoom,

    /// A moderator-only action attempted by a player.
    #[error("only the moderator can do that")]
    Forbidden,

    /// Joining or authoring after the first question started.
    #[error("the game has already started")]
    GameAlreadyStarted,

    /// Another connected participant already uses this nickname.
    #[error("nickname already in use")]
    NicknameTaken,

    /// The question draft failed validation.
    #[error("invalid question: {0}")]
    InvalidQuestion(String),

    /// `startQuestion` with an empty question list.
    #[error("no questions available")]
    NoQuestions,

    /// `startQuestion` past the last question.
    #[error("no more questions")]
    NoMoreQuestions,

    /// `startQuestion` while a question is live. At most one question
    /// is active per room at any instant.
    #[error("a question is already active")]
    QuestionAlreadyActive,

    /// `submitAnswer`/`endQuestion` with no live question.
    #[error("no question is active")]
    NoActiveQuestion,

    /// The caller already answered the active question.
    #[error("you already answered this question")]
    AlreadyAnswered,

    /// Any action on a finished session.
    #[error("the game is finished")]
    GameFinished,

    /// The engine task is gone (server shutting down); the command was
    /// never applied.
    #[error("engine unavailable")]
    Unavailable,
}
