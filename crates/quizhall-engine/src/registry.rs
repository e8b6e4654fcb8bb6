//! Room registry: owns every room and the participant → room index.
//!
//! This is the single owner of all `Room` records. Higher layers (the
//! session operations) borrow rooms from here; nothing else holds one.

use std::collections::HashMap;

use quizhall_protocol::{Participant, ParticipantId, RoomCode};

use crate::ids::generate_room_code;
use crate::room::Room;
use crate::EngineError;

/// Maps room codes to rooms, and each participant to the room they are
/// currently in. A participant is in at most one room at a time.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    participant_rooms: HashMap<ParticipantId, RoomCode>,
}

impl RoomRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a room with the caller as moderator and sole participant.
    ///
    /// Room codes are drawn at random and retried on collision; with a
    /// 36^4 code space this terminates immediately in practice.
    pub fn create_room(
        &mut self,
        moderator_id: ParticipantId,
        moderator_nickname: String,
    ) -> Result<&Room, EngineError> {
        if self.participant_rooms.contains_key(&moderator_id) {
            return Err(EngineError::AlreadyInRoom);
        }

        let code = loop {
            let candidate = generate_room_code();
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let room = Room::new(
            crate::ids::generate_room_id(),
            code.clone(),
            moderator_id.clone(),
            moderator_nickname,
        );
        self.participant_rooms.insert(moderator_id, code.clone());
        self.rooms.insert(code.clone(), room);

        tracing::info!(room = %code, "room created");
        Ok(&self.rooms[&code])
    }

    /// Adds a player to a room by code.
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        participant_id: ParticipantId,
        nickname: String,
    ) -> Result<&Room, EngineError> {
        if self.participant_rooms.contains_key(&participant_id) {
            return Err(EngineError::AlreadyInRoom);
        }

        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| EngineError::RoomNotFound(code.clone()))?;

        if room.phase().is_started() {
            return Err(EngineError::GameAlreadyStarted);
        }
        if room.nickname_taken(&nickname) {
            return Err(EngineError::NicknameTaken);
        }

        room.add_participant(Participant {
            id: participant_id.clone(),
            nickname: nickname.clone(),
            score: 0,
            is_connected: true,
        });
        self.participant_rooms
            .insert(participant_id, code.clone());

        tracing::info!(room = %code, %nickname, "player joined");
        Ok(&self.rooms[code])
    }

    /// Reverse lookup: the code of the room a participant is in.
    pub fn room_code_of(&self, participant_id: &ParticipantId) -> Option<&RoomCode> {
        self.participant_rooms.get(participant_id)
    }

    /// The room a participant is currently in.
    pub fn room_of(&self, participant_id: &ParticipantId) -> Option<&Room> {
        let code = self.participant_rooms.get(participant_id)?;
        self.rooms.get(code)
    }

    /// Mutable access to a participant's current room.
    pub fn room_of_mut(&mut self, participant_id: &ParticipantId) -> Option<&mut Room> {
        let code = self.participant_rooms.get(participant_id)?;
        self.rooms.get_mut(code)
    }

    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn room_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Drops a participant's reverse-index entry (they left their room).
    pub fn forget_participant(&mut self, participant_id: &ParticipantId) {
        self.participant_rooms.remove(participant_id);
    }

    /// Tears down a room entirely, dropping every member's index entry.
    /// Returns the removed room so the caller can notify its members
    /// and cancel any live timer.
    pub fn remove_room(&mut self, code: &RoomCode) -> Option<Room> {
        let room = self.rooms.remove(code)?;
        self.participant_rooms.retain(|_, c| c != code);
        tracing::info!(room = %code, "room destroyed");
        Some(room)
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

// =========================================================================
// Tests
// =========================================================================
