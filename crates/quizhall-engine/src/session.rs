//! The game session operations: the authoritative trivia state machine.
//!
//! Every mutation of room state goes through a method on [`GameSession`].
//! Each operation validates its preconditions before touching anything,
//! so an invalid command can never leave a room half-mutated; on success
//! the operation delivers caller acks and roomcasts through the
//! [`BroadcastRouter`]. Failures are returned to the gateway, which
//! translates them into a uniform `error` event for the caller alone.

use std::time::Duration;

use quizhall_protocol::{
    Answer, AnswerSummary, ParticipantId, QuestionDraft, QuestionKind, RoomCode,
    ServerEvent,
};

use crate::broadcast::{BroadcastRouter, EventSender};
use crate::ids::generate_question_id;
use crate::registry::RoomRegistry;
use crate::room::{now_millis, QuestionTimer, SessionPhase};
use crate::EngineError;

/// A request to arm the countdown for a freshly started question.
///
/// Returned by [`GameSession::start_next_question`]; the engine actor
/// spawns the sleep task and attaches its handle to the room. The
/// question index travels with the request so a late fire can be
/// recognized as stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerRequest {
    pub room_code: RoomCode,
    pub question_index: usize,
    pub duration: Duration,
}

/// The session engine: owns the registry and the router, and applies
/// every command under single-writer semantics. Not thread-safe by
/// itself — it lives inside the engine actor task, which serializes
/// commands in receipt order.
pub struct GameSession {
    registry: RoomRegistry,
    router: BroadcastRouter,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            registry: RoomRegistry::new(),
            router: BroadcastRouter::new(),
        }
    }

    /// Read access to the registry (used by tests and room listings).
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Creates a room with the caller as moderator.
    pub fn create_room(
        &mut self,
        caller: ParticipantId,
        nickname: String,
        sender: EventSender,
    ) -> Result<(), EngineError> {
        let room = self.registry.create_room(caller.clone(), nickname)?;
        let snapshot = room.snapshot();
        self.router.register(caller.clone(), sender);
        self.router.unicast(
            &caller,
            ServerEvent::RoomCreated {
                room: snapshot,
                moderator_id: caller.clone(),
            },
        );
        Ok(())
    }

    /// Joins the caller to a room by code.
    pub fn join_room(
        &mut self,
        caller: ParticipantId,
        code: RoomCode,
        nickname: String,
        sender: EventSender,
    ) -> Result<(), EngineError> {
        let room = self
            .registry
            .join_room(&code, caller.clone(), nickname)?;
        let snapshot = room.snapshot();
        let player = room
            .participant(&caller)
            .expect("caller was just added to the room")
            .clone();

        self.router.register(caller.clone(), sender);
        self.router.unicast(
            &caller,
            ServerEvent::RoomJoined {
                room: snapshot.clone(),
                player_id: caller.clone(),
            },
        );
        // Everyone in the room (the joiner included) sees the arrival.
        self.router.roomcast(
            room,
            &ServerEvent::PlayerJoined {
                player,
                room: snapshot,
            },
            None,
        );
        Ok(())
    }

    /// Removes the caller from their room. A no-op when the caller is
    /// not in any room; never fails.
    pub fn leave_room(&mut self, caller: &ParticipantId) {
        let Some(room) = self.registry.room_of_mut(caller) else {
            return;
        };
        let code = room.code().clone();

        if room.is_moderator(caller) {
            self.teardown_room(&code, caller, "the moderator has left the room");
            return;
        }

        room.remove_participant(caller);
        let snapshot = room.snapshot();
        self.router.unregister(caller);
        self.router.roomcast(
            &*room,
            &ServerEvent::PlayerLeft {
                player_id: caller.clone(),
                room: snapshot,
            },
            None,
        );
        self.registry.forget_participant(caller);
        tracing::info!(room = %code, participant = %caller, "player left");
    }

    /// Handles a transport disconnect: the participant record stays
    /// (marked disconnected) so their score survives, but they stop
    /// receiving events. Moderator disconnection tears the room down.
    pub fn disconnect(&mut self, caller: &ParticipantId) {
        self.router.unregister(caller);

        let Some(room) = self.registry.room_of_mut(caller) else {
            return;
        };
        let code = room.code().clone();

        if room.is_moderator(caller) {
            self.teardown_room(&code, caller, "the moderator has disconnected");
            return;
        }

        room.mark_disconnected(caller);
        let snapshot = room.snapshot();
        self.router.roomcast(
            &*room,
            &ServerEvent::PlayerLeft {
                player_id: caller.clone(),
                room: snapshot,
            },
            None,
        );
        self.registry.forget_participant(caller);
        tracing::info!(room = %code, participant = %caller, "player disconnected");
    }

    /// Deletes a room and notifies the remaining members. The session
    /// cannot continue without its moderator, so this is the one
    /// failure with room-wide visibility.
    fn teardown_room(&mut self, code: &RoomCode, departing: &ParticipantId, reason: &str) {
        let Some(mut room) = self.registry.remove_room(code) else {
            return;
        };
        if let Some(timer) = room.timer.take() {
            timer.handle.abort();
        }
        self.router.roomcast(
            &room,
            &ServerEvent::Error {
                message: reason.into(),
            },
            Some(departing),
        );
        for participant in room.participants() {
            self.router.unregister(&participant.id);
        }
        tracing::info!(room = %code, %reason, "room torn down");
    }

    // -----------------------------------------------------------------------
    // Question authoring
    // -----------------------------------------------------------------------

    /// Moderator only, lobby only: appends a validated question.
    pub fn add_question(
        &mut self,
        caller: &ParticipantId,
        draft: QuestionDraft,
    ) -> Result<(), EngineError> {
        let room = self
            .registry
            .room_of_mut(caller)
            .ok_or(EngineError::NotInRoom)?;
        if !room.is_moderator(caller) {
            return Err(EngineError::Forbidden);
        }
        if room.phase().is_started() {
            return Err(EngineError::GameAlreadyStarted);
        }
        validate_draft(&draft)?;

        let question = draft.into_question(generate_question_id());
        let code = room.code().clone();
        room.push_question(question);
        tracing::debug!(room = %code, "question added");

        self.router
            .unicast(caller, ServerEvent::QuestionAdded { success: true });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Question lifecycle
    // -----------------------------------------------------------------------

    /// Moderator only: activates the next question and asks the actor
    /// to arm its countdown.
    pub fn start_next_question(
        &mut self,
        caller: &ParticipantId,
    ) -> Result<TimerRequest, EngineError> {
        let room = self
            .registry
            .room_of_mut(caller)
            .ok_or(EngineError::NotInRoom)?;
        if !room.is_moderator(caller) {
            return Err(EngineError::Forbidden);
        }
        match room.phase() {
            SessionPhase::Finished => return Err(EngineError::GameFinished),
            SessionPhase::QuestionActive => {
                return Err(EngineError::QuestionAlreadyActive)
            }
            SessionPhase::Lobby | SessionPhase::BetweenQuestions => {}
        }
        if room.questions().is_empty() {
            return Err(EngineError::NoQuestions);
        }
        let next = room.current_question_index().map_or(0, |i| i + 1);
        if next >= room.questions().len() {
            return Err(EngineError::NoMoreQuestions);
        }

        let index = room.begin_next_question();
        let question = room.questions()[index].clone();
        let code = room.code().clone();
        tracing::info!(room = %code, index, "question started");

        self.router.roomcast(
            &*room,
            &ServerEvent::QuestionStarted {
                question: question.clone(),
                time_limit: question.time_limit_seconds,
            },
            None,
        );

        Ok(TimerRequest {
            room_code: code,
            question_index: index,
            duration: Duration::from_secs(question.time_limit_seconds),
        })
    }

    /// Stores the spawned countdown's handle on the room so a manual
    /// end can cancel it.
    pub(crate) fn attach_timer(&mut self, code: &RoomCode, timer: QuestionTimer) {
        if let Some(room) = self.registry.room_mut(code) {
            room.timer = Some(timer);
        } else {
            // Room vanished between start and attach; kill the orphan.
            timer.handle.abort();
        }
    }

    /// Scores an answer to the active question.
    ///
    /// The roomcast carries a redacted summary; only the submitter
    /// learns whether they were right, and only their own unicast
    /// carries the selected option.
    pub fn submit_answer(
        &mut self,
        caller: &ParticipantId,
        selected_option: usize,
    ) -> Result<(), EngineError> {
        let room = self
            .registry
            .room_of_mut(caller)
            .ok_or(EngineError::NotInRoom)?;
        let question = room
            .active_question()
            .ok_or(EngineError::NoActiveQuestion)?;
        let question_id = question.id.clone();
        let correct_index = question.correct_option_index;
        let points = question.points;

        // One submission per participant per question.
        if !room.record_answered(caller) {
            return Err(EngineError::AlreadyAnswered);
        }

        let is_correct = selected_option == correct_index;
        if is_correct {
            room.award_points(caller, points);
        }
        let code = room.code().clone();

        let answer = Answer {
            participant_id: caller.clone(),
            question_id,
            selected_option_index: selected_option,
            is_correct,
            submitted_at: now_millis(),
        };
        tracing::debug!(room = %code, participant = %caller, is_correct, "answer submitted");

        self.router.roomcast(
            &*room,
            &ServerEvent::AnswerSubmitted {
                answer: AnswerSummary::from(&answer),
            },
            None,
        );
        self.router
            .unicast(caller, ServerEvent::AnswerResult { answer });
        Ok(())
    }

    /// Moderator only: ends the active question early. Cancels the
    /// countdown task; the phase guard would render its fire a no-op
    /// anyway, but there is no reason to keep it waiting.
    pub fn end_question(&mut self, caller: &ParticipantId) -> Result<(), EngineError> {
        let code = {
            let room = self
                .registry
                .room_of_mut(caller)
                .ok_or(EngineError::NotInRoom)?;
            if !room.is_moderator(caller) {
                return Err(EngineError::Forbidden);
            }
            if room.phase() != SessionPhase::QuestionActive {
                return Err(EngineError::NoActiveQuestion);
            }
            if let Some(timer) = room.timer.take() {
                timer.handle.abort();
            }
            room.code().clone()
        };
        self.finish_active_question(&code);
        Ok(())
    }

    /// Countdown expiry. Equivalent to the moderator ending the
    /// question, except a stale fire (question already ended, room
    /// gone) is silently ignored — idempotent by state guard.
    pub fn question_timeout(&mut self, code: &RoomCode, question_index: usize) {
        let Some(room) = self.registry.room_mut(code) else {
            return;
        };
        if room.phase() != SessionPhase::QuestionActive
            || room.current_question_index() != Some(question_index)
        {
            tracing::debug!(room = %code, question_index, "stale timer fire ignored");
            return;
        }
        room.timer = None;
        tracing::info!(room = %code, question_index, "question timed out");
        self.finish_active_question(code);
    }

    /// Shared tail of the two end paths: transition the phase and
    /// broadcast results or final standings.
    fn finish_active_question(&mut self, code: &RoomCode) {
        let Some(room) = self.registry.room_mut(code) else {
            return;
        };
        let finished = room.end_active_question();
        let scores = room.sorted_scores();

        let event = if finished {
            ServerEvent::GameFinished {
                final_scores: scores,
            }
        } else {
            ServerEvent::QuestionEnded {
                results: Vec::new(),
                scores,
            }
        };
        self.router.roomcast(&*room, &event, None);
        tracing::info!(room = %code, finished, "question ended");
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects drafts that could never be answered.
fn validate_draft(draft: &QuestionDraft) -> Result<(), EngineError> {
    match draft.kind {
        QuestionKind::Multiple if draft.options.len() < 2 => {
            return Err(EngineError::InvalidQuestion(
                "multiple-choice needs at least two options".into(),
            ));
        }
        QuestionKind::Boolean if draft.options.len() != 2 => {
            return Err(EngineError::InvalidQuestion(
                "boolean needs exactly two options".into(),
            ));
        }
        _ => {}
    }
    if draft.correct_option_index >= draft.options.len() {
        return Err(EngineError::InvalidQuestion(
            "correct option out of range".into(),
        ));
    }
    if draft.time_limit_seconds == 0 {
        return Err(EngineError::InvalidQuestion(
            "time limit must be positive".into(),
        ));
    }
    if draft.points == 0 {
        return Err(EngineError::InvalidQuestion(
            "points must be positive".into(),
        ));
    }
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
