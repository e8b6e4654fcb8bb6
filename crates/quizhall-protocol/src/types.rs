//! Core wire types for the Quizhall protocol.
//!
//! Everything in this module travels between client and server as JSON.
//! Field and tag names are camelCase on the wire (`roomCode`,
//! `moderatorNickname`, …) so browser clients can consume the payloads
//! without a translation layer.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An opaque identifier for a participant (moderator or player).
///
/// Newtype over `String`: a `ParticipantId` can never be confused with a
/// `RoomCode` or `QuestionId` in a signature, even though all three are
/// strings underneath. Participants are ephemeral — the id exists for
/// the lifetime of one connection and is never persisted.
///
/// `#[serde(transparent)]` serializes the wrapper as the bare string, so
/// `ParticipantId("k3x9q0a7f")` becomes `"k3x9q0a7f"` in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque identifier for a room record (distinct from the join code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The short human-shareable join code: 4 characters from `[A-Z0-9]`.
///
/// This is what a moderator reads out loud and players type in. The
/// engine guarantees the charset and length at generation time; the
/// protocol layer treats it as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Borrows the code as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque identifier for a question, assigned when the moderator adds it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A participant as seen on the wire: identity, display name, score,
/// and whether their transport is currently connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub nickname: String,
    pub score: u32,
    /// Flips to `false` on transport disconnect. Disconnected
    /// participants stay in the room record but receive no events.
    pub is_connected: bool,
}

/// The two supported question shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionKind {
    /// Free-form options, at least two.
    Multiple,
    /// Exactly two fixed-label options (true/false style).
    Boolean,
}

/// A question authored by the moderator. Immutable once the game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    pub time_limit_seconds: u64,
    pub points: u32,
}

/// A question as submitted by the moderator — everything but the id,
/// which the engine assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub text: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    pub time_limit_seconds: u64,
    pub points: u32,
}

impl QuestionDraft {
    /// Stamps the draft with an id, producing the immutable record.
    pub fn into_question(self, id: QuestionId) -> Question {
        Question {
            id,
            text: self.text,
            kind: self.kind,
            options: self.options,
            correct_option_index: self.correct_option_index,
            time_limit_seconds: self.time_limit_seconds,
            points: self.points,
        }
    }
}

/// A scored answer. Sent only to the participant who submitted it —
/// the roomcast sees [`AnswerSummary`] instead, so nobody can infer
/// the correct option from someone else's result mid-question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub participant_id: ParticipantId,
    pub question_id: QuestionId,
    pub selected_option_index: usize,
    pub is_correct: bool,
    /// Unix timestamp in milliseconds.
    pub submitted_at: u64,
}

/// The redacted view of an answer: who answered which question, and
/// when. No selected option, no correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSummary {
    pub participant_id: ParticipantId,
    pub question_id: QuestionId,
    pub submitted_at: u64,
}

impl From<&Answer> for AnswerSummary {
    fn from(answer: &Answer) -> Self {
        Self {
            participant_id: answer.participant_id.clone(),
            question_id: answer.question_id.clone(),
            submitted_at: answer.submitted_at,
        }
    }
}

/// The full room record as carried in events (`roomCreated`,
/// `playerJoined`, …). `currentQuestionIndex` is `-1` until the first
/// question has been activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub code: RoomCode,
    pub moderator_id: ParticipantId,
    /// Insertion order is join order; score ties are broken by it.
    pub players: Vec<Participant>,
    pub questions: Vec<Question>,
    pub current_question_index: i32,
    pub is_game_started: bool,
    pub is_game_finished: bool,
    /// Unix timestamp in milliseconds.
    pub created_at: u64,
}

// ---------------------------------------------------------------------------
// Commands (client → server)
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
/// `{ "type": "joinRoom", "roomCode": "AB12", "playerNickname": "ada" }`.
/// The caller's identity is never part of the payload — the gateway
/// substitutes the connection's participant id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    /// Create a room and become its moderator.
    CreateRoom { moderator_nickname: String },

    /// Join an existing room by code.
    JoinRoom {
        room_code: RoomCode,
        player_nickname: String,
    },

    /// Moderator only: append a question to the room's list.
    AddQuestion { question: QuestionDraft },

    /// Moderator only: activate the next question and arm its timer.
    StartQuestion,

    /// Answer the currently active question.
    SubmitAnswer { selected_option: usize },

    /// Moderator only: end the active question before the timer fires.
    EndQuestion,

    /// Leave the current room.
    LeaveRoom,
}

// ---------------------------------------------------------------------------
// Events (server → client)
// ---------------------------------------------------------------------------

/// Everything the server can tell a client.
///
/// Same internally tagged JSON shape as [`ClientCommand`]. An event is
/// either a direct reply to the caller (`roomCreated`, `error`) or a
/// roomcast fanned out to every connected participant of one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Caller only: room created, you are the moderator.
    RoomCreated {
        room: RoomSnapshot,
        moderator_id: ParticipantId,
    },

    /// Caller only: you joined the room.
    RoomJoined {
        room: RoomSnapshot,
        player_id: ParticipantId,
    },

    /// Roomcast: a new player appeared.
    PlayerJoined {
        player: Participant,
        room: RoomSnapshot,
    },

    /// Caller only: the question was accepted.
    QuestionAdded { success: bool },

    /// Roomcast: a question is live, the countdown has started.
    QuestionStarted { question: Question, time_limit: u64 },

    /// Roomcast: someone answered (redacted — see [`AnswerSummary`]).
    AnswerSubmitted { answer: AnswerSummary },

    /// Caller only: your answer, scored.
    AnswerResult { answer: Answer },

    /// Roomcast: question over, scores so far (descending, ties by
    /// join order). `results` is always empty — answers are not kept
    /// beyond their own broadcast.
    QuestionEnded {
        results: Vec<AnswerSummary>,
        scores: Vec<Participant>,
    },

    /// Roomcast: that was the last question.
    GameFinished { final_scores: Vec<Participant> },

    /// Roomcast: a player left or disconnected.
    PlayerLeft {
        player_id: ParticipantId,
        room: RoomSnapshot,
    },

    /// Caller only (or roomcast on moderator departure): something
    /// went wrong, human-readable.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================
