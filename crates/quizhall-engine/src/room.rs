//! The room entity and its session phase state machine.
//!
//! A `Room` is one trivia session: one moderator, the players who
//! joined with its code, the authored questions, and the live phase.
//! Rooms are owned exclusively by the [`RoomRegistry`](crate::RoomRegistry)
//! and mutated only through the session operations — single-writer by
//! construction.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use quizhall_protocol::{
    Participant, ParticipantId, Question, RoomCode, RoomId, RoomSnapshot,
};
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a room's game session.
///
/// ```text
/// Lobby → QuestionActive ⇄ BetweenQuestions → Finished
/// ```
///
/// - **Lobby**: players can join, the moderator authors questions.
/// - **QuestionActive**: exactly one question is live and its countdown
///   is armed. At most one question is active per room at any instant —
///   enforced here, not by timer cancellation.
/// - **BetweenQuestions**: results shown, waiting for the moderator to
///   start the next question.
/// - **Finished**: terminal. No further question can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Lobby,
    QuestionActive,
    BetweenQuestions,
    Finished,
}

impl SessionPhase {
    /// Whether new players may still join.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Whether the first question has been started.
    pub fn is_started(self) -> bool {
        !matches!(self, Self::Lobby)
    }

    /// Whether a question is currently live.
    pub fn is_question_active(self) -> bool {
        matches!(self, Self::QuestionActive)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::QuestionActive => write!(f, "QuestionActive"),
            Self::BetweenQuestions => write!(f, "BetweenQuestions"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// Handle to a spawned countdown task for the active question. The
/// fired command carries its own question index, so a fire that raced
/// the abort is still recognized as stale.
#[derive(Debug)]
pub(crate) struct QuestionTimer {
    pub(crate) handle: JoinHandle<()>,
}

/// One trivia session.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    code: RoomCode,
    moderator_id: ParticipantId,
    /// Insertion order is join order — score ties are broken by it.
    participants: Vec<Participant>,
    questions: Vec<Question>,
    /// `None` until the first question is activated. Monotonically
    /// non-decreasing over the room's lifetime.
    current_question: Option<usize>,
    phase: SessionPhase,
    created_at: u64,
    /// Participants who already answered the active question.
    answered: HashSet<ParticipantId>,
    /// The live countdown, if a question is active.
    pub(crate) timer: Option<QuestionTimer>,
}

impl Room {
    /// Creates a room in the lobby phase with the moderator as its sole
    /// participant.
    pub fn new(
        id: RoomId,
        code: RoomCode,
        moderator_id: ParticipantId,
        moderator_nickname: String,
    ) -> Self {
        let moderator = Participant {
            id: moderator_id.clone(),
            nickname: moderator_nickname,
            score: 0,
            is_connected: true,
        };
        Self {
            id,
            code,
            moderator_id,
            participants: vec![moderator],
            questions: Vec::new(),
            current_question: None,
            phase: SessionPhase::Lobby,
            created_at: now_millis(),
            answered: HashSet::new(),
            timer: None,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn moderator_id(&self) -> &ParticipantId {
        &self.moderator_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn is_moderator(&self, id: &ParticipantId) -> bool {
        self.moderator_id == *id
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == *id)
    }

    fn participant_mut(&mut self, id: &ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == *id)
    }

    /// Whether any **connected** participant already uses this nickname.
    /// A disconnected participant's nickname may be reused.
    pub fn nickname_taken(&self, nickname: &str) -> bool {
        self.participants
            .iter()
            .any(|p| p.is_connected && p.nickname == nickname)
    }

    /// Appends a player at the end of the join order.
    pub fn add_participant(&mut self, participant: Participant) {
        self.participants.push(participant);
    }

    /// Removes a participant entirely (explicit leave).
    pub fn remove_participant(&mut self, id: &ParticipantId) -> Option<Participant> {
        let idx = self.participants.iter().position(|p| p.id == *id)?;
        Some(self.participants.remove(idx))
    }

    /// Flags a participant's transport as gone. The record stays so
    /// their score survives in the final standings.
    pub fn mark_disconnected(&mut self, id: &ParticipantId) {
        if let Some(p) = self.participant_mut(id) {
            p.is_connected = false;
        }
    }

    // -- Question sequencing ------------------------------------------------

    /// Index of the current question, or `None` before the first start.
    pub fn current_question_index(&self) -> Option<usize> {
        self.current_question
    }

    /// The live question, if the room is in `QuestionActive`.
    pub fn active_question(&self) -> Option<&Question> {
        if self.phase != SessionPhase::QuestionActive {
            return None;
        }
        self.current_question.and_then(|i| self.questions.get(i))
    }

    /// Whether the current question is the last one in the list.
    pub fn is_last_question(&self) -> bool {
        match self.current_question {
            Some(i) => i + 1 >= self.questions.len(),
            None => false,
        }
    }

    /// Appends a question. Only valid in the lobby; the session
    /// operation checks that before calling.
    pub fn push_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    /// Advances to the next question and enters `QuestionActive`.
    /// Returns the new index. The index only ever moves forward.
    pub fn begin_next_question(&mut self) -> usize {
        let next = self.current_question.map_or(0, |i| i + 1);
        self.current_question = Some(next);
        self.phase = SessionPhase::QuestionActive;
        self.answered.clear();
        next
    }

    /// Ends the live question: `BetweenQuestions`, or `Finished` when
    /// it was the last one. Returns `true` if the session finished.
    pub fn end_active_question(&mut self) -> bool {
        if self.is_last_question() {
            self.phase = SessionPhase::Finished;
            true
        } else {
            self.phase = SessionPhase::BetweenQuestions;
            false
        }
    }

    // -- Answers and scoring ------------------------------------------------

    /// Records that a participant answered the active question.
    /// Returns `false` if they had already answered it.
    pub fn record_answered(&mut self, id: &ParticipantId) -> bool {
        self.answered.insert(id.clone())
    }

    /// Adds points to a participant's score, saturating at `u32::MAX`
    /// — a score must never take the engine down.
    pub fn award_points(&mut self, id: &ParticipantId, points: u32) {
        if let Some(p) = self.participant_mut(id) {
            p.score = p.score.saturating_add(points);
        }
    }

    /// Participants sorted by score descending. The sort is stable, so
    /// ties keep their original join order.
    pub fn sorted_scores(&self) -> Vec<Participant> {
        let mut scores = self.participants.clone();
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores
    }

    // -- Snapshot -----------------------------------------------------------

    /// The wire view of this room, as carried in events.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            code: self.code.clone(),
            moderator_id: self.moderator_id.clone(),
            players: self.participants.clone(),
            questions: self.questions.clone(),
            current_question_index: self
                .current_question
                .map_or(-1, |i| i as i32),
            is_game_started: self.phase.is_started(),
            is_game_finished: self.phase == SessionPhase::Finished,
            created_at: self.created_at,
        }
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =========================================================================
// Tests
// =========================================================================
