//! Broadcast router: delivers events to the right participants.
//!
//! Each connection registers an unbounded sender here; the gateway's
//! writer task drains the matching receiver onto the socket. Because
//! every event for a participant goes through that one channel, each
//! participant observes its own stream in emission order (per-recipient
//! FIFO). Fan-out across participants carries no ordering guarantee.

use std::collections::HashMap;

use quizhall_protocol::{ParticipantId, ServerEvent};
use tokio::sync::mpsc;

use crate::room::Room;

/// Channel sender carrying events to one participant's connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Routes engine events to connected participants.
#[derive(Default)]
pub struct BroadcastRouter {
    senders: HashMap<ParticipantId, EventSender>,
}

impl BroadcastRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a participant's outbound channel.
    pub fn register(&mut self, participant_id: ParticipantId, sender: EventSender) {
        self.senders.insert(participant_id, sender);
    }

    /// Drops a participant's channel (connection gone or room left).
    pub fn unregister(&mut self, participant_id: &ParticipantId) {
        self.senders.remove(participant_id);
    }

    /// Delivers an event to a single participant. Silently drops if the
    /// receiver is gone — the disconnect path will clean up shortly.
    pub fn unicast(&self, participant_id: &ParticipantId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(participant_id) {
            let _ = sender.send(event);
        }
    }

    /// Delivers an event to every connected participant of a room,
    /// except the optional exclusion.
    pub fn roomcast(
        &self,
        room: &Room,
        event: &ServerEvent,
        exclude: Option<&ParticipantId>,
    ) {
        for participant in room.participants() {
            if !participant.is_connected {
                continue;
            }
            if exclude.is_some_and(|ex| *ex == participant.id) {
                continue;
            }
            self.unicast(&participant.id, event.clone());
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quizhall_protocol::{Participant, RoomCode, RoomId};

    fn pid(s: &str) -> ParticipantId {
        ParticipantId(s.into())
    }

    fn event(msg: &str) -> ServerEvent {
        ServerEvent::Error {
            message: msg.into(),
        }
    }

    fn room_with_players(ids: &[&str]) -> Room {
        let mut room = Room::new(
            RoomId("r".into()),
            RoomCode("AB12".into()),
            pid(ids[0]),
            ids[0].into(),
        );
        for id in &ids[1..] {
            room.add_participant(Participant {
                id: pid(id),
                nickname: (*id).into(),
                score: 0,
                is_connected: true,
            });
        }
        room
    }

    #[test]
    fn test_unicast_reaches_only_the_target() {
        let mut router = BroadcastRouter::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        router.register(pid("a"), tx_a);
        router.register(pid("b"), tx_b);

        router.unicast(&pid("a"), event("hi"));

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_unicast_to_unknown_participant_is_a_noop() {
        let router = BroadcastRouter::new();
        router.unicast(&pid("ghost"), event("hi"));
    }

    #[test]
    fn test_roomcast_excludes_requested_participant() {
        let mut router = BroadcastRouter::new();
        let room = room_with_players(&["mod", "p1", "p2"]);
        let (tx_m, mut rx_m) = mpsc::unbounded_channel();
        let (tx_1, mut rx_1) = mpsc::unbounded_channel();
        let (tx_2, mut rx_2) = mpsc::unbounded_channel();
        router.register(pid("mod"), tx_m);
        router.register(pid("p1"), tx_1);
        router.register(pid("p2"), tx_2);

        router.roomcast(&room, &event("go"), Some(&pid("p1")));

        assert!(rx_m.try_recv().is_ok());
        assert!(rx_1.try_recv().is_err());
        assert!(rx_2.try_recv().is_ok());
    }

    #[test]
    fn test_roomcast_skips_disconnected_participants() {
        let mut router = BroadcastRouter::new();
        let mut room = room_with_players(&["mod", "p1"]);
        room.mark_disconnected(&pid("p1"));
        let (tx_m, mut rx_m) = mpsc::unbounded_channel();
        let (tx_1, mut rx_1) = mpsc::unbounded_channel();
        router.register(pid("mod"), tx_m);
        router.register(pid("p1"), tx_1);

        router.roomcast(&room, &event("go"), None);

        assert!(rx_m.try_recv().is_ok());
        assert!(rx_1.try_recv().is_err());
    }

    #[test]
    fn test_events_arrive_in_emission_order() {
        let mut router = BroadcastRouter::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        router.register(pid("a"), tx);

        router.unicast(&pid("a"), event("first"));
        router.unicast(&pid("a"), event("second"));

        assert_eq!(rx.try_recv().unwrap(), event("first"));
        assert_eq!(rx.try_recv().unwrap(), event("second"));
    }
}
