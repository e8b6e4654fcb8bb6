//! Opaque id and room-code generation.
//!
//! Room codes are short because a moderator reads them out loud; the
//! other ids only need to be unguessable enough to never collide inside
//! one process lifetime.

use quizhall_protocol::{ParticipantId, QuestionId, RoomCode, RoomId};
use rand::Rng;

/// The characters a room code may contain. Uppercase-only keeps codes
/// unambiguous when spoken.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a room code. 36^4 ≈ 1.7M codes — collisions are handled
/// by retrying at registration time.
pub const ROOM_CODE_LEN: usize = 4;

/// Length of opaque ids (participants, rooms, questions).
const OPAQUE_ID_LEN: usize = 9;

/// Generates a 4-character room code from `[A-Z0-9]`.
pub fn generate_room_code() -> RoomCode {
    let mut rng = rand::rng();
    let code: String = (0..ROOM_CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ROOM_CODE_ALPHABET.len());
            ROOM_CODE_ALPHABET[idx] as char
        })
        .collect();
    RoomCode(code)
}

/// Generates an ephemeral participant id for one connection.
pub fn generate_participant_id() -> ParticipantId {
    ParticipantId(opaque_id())
}

/// Generates a room record id (distinct from the join code).
pub fn generate_room_id() -> RoomId {
    RoomId(opaque_id())
}

/// Generates a question id, assigned when the moderator adds a question.
pub fn generate_question_id() -> QuestionId {
    QuestionId(opaque_id())
}

/// A 9-character lowercase base-36 string.
fn opaque_id() -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..OPAQUE_ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_code_is_four_chars_from_alphabet() {
        for _ in 0..100 {
            let code = generate_room_code();
            assert_eq!(code.as_str().len(), 4);
            assert!(code
                .as_str()
                .bytes()
                .all(|b| ROOM_CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_opaque_ids_have_expected_shape() {
        let id = generate_participant_id();
        assert_eq!(id.0.len(), 9);
        assert!(id.0.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_participant_ids_are_distinct() {
        // 36^9 is large enough that any collision in 1000 draws means
        // the generator is broken.
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_participant_id().0));
        }
    }
}
