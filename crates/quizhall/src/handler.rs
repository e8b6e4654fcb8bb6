//! Per-connection handler: identity, event delivery, command routing.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Assign a fresh participant id (identity is per-connection,
//!      there is no handshake or authentication)
//!   2. Spawn the writer pump: events queued for this participant are
//!      encoded and sent in queue order
//!   3. Loop: receive commands → dispatch to the engine → translate
//!      rejections into an `error` event for this client alone

use std::sync::Arc;

use quizhall_engine::{generate_participant_id, EngineError, EngineHandle};
use quizhall_protocol::{ClientCommand, Codec, ParticipantId, ServerEvent};
use quizhall_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::server::ServerState;
use crate::QuizhallError;

/// Drop guard that reports the disconnect when the handler exits.
///
/// This ensures the engine hears about the closed transport even if
/// the handler panics. Since `Drop` is synchronous, the async send is
/// spawned fire-and-forget.
struct DisconnectGuard {
    participant_id: ParticipantId,
    engine: EngineHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let participant_id = self.participant_id.clone();
        let engine = self.engine.clone();
        tokio::spawn(async move {
            engine.disconnect(participant_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), QuizhallError> {
    let conn = Arc::new(conn);
    let participant_id = generate_participant_id();
    tracing::debug!(conn_id = %conn.id(), %participant_id, "handling new connection");

    // Everything this client will ever receive flows through one
    // queue, so delivery order matches emission order.
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(pump_events(
        events_rx,
        Arc::clone(&conn),
        Arc::clone(&state),
    ));

    let guard = DisconnectGuard {
        participant_id: participant_id.clone(),
        engine: state.engine.clone(),
    };

    loop {
        let text = match conn.recv().await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::info!(%participant_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%participant_id, error = %e, "recv error");
                break;
            }
        };

        let command: ClientCommand = match state.codec.decode(text.as_bytes()) {
            Ok(cmd) => cmd,
            Err(e) => {
                tracing::debug!(%participant_id, error = %e, "failed to decode command");
                let _ = events_tx.send(ServerEvent::Error {
                    message: format!("invalid command: {e}"),
                });
                continue;
            }
        };

        if let Err(e) =
            dispatch(&state.engine, &participant_id, command, &events_tx).await
        {
            // The engine rejected the command; only the caller hears
            // about it. Room state is untouched.
            tracing::debug!(%participant_id, error = %e, "command rejected");
            let _ = events_tx.send(ServerEvent::Error {
                message: e.to_string(),
            });
        }
    }

    // The disconnect must reach the engine before the pump can end:
    // the router holds a sender clone until the engine processes it.
    drop(guard);
    drop(events_tx);
    let _ = writer.await;
    let _ = conn.close().await;
    Ok(())
}

/// Routes one decoded command to the engine.
async fn dispatch(
    engine: &EngineHandle,
    participant_id: &ParticipantId,
    command: ClientCommand,
    events_tx: &UnboundedSender<ServerEvent>,
) -> Result<(), EngineError> {
    match command {
        ClientCommand::CreateRoom { moderator_nickname } => {
            engine
                .create_room(
                    participant_id.clone(),
                    moderator_nickname,
                    events_tx.clone(),
                )
                .await
        }
        ClientCommand::JoinRoom {
            room_code,
            player_nickname,
        } => {
            engine
                .join_room(
                    participant_id.clone(),
                    room_code,
                    player_nickname,
                    events_tx.clone(),
                )
                .await
        }
        ClientCommand::AddQuestion { question } => {
            engine.add_question(participant_id.clone(), question).await
        }
        ClientCommand::StartQuestion => {
            engine.start_question(participant_id.clone()).await
        }
        ClientCommand::SubmitAnswer { selected_option } => {
            engine
                .submit_answer(participant_id.clone(), selected_option)
                .await
        }
        ClientCommand::EndQuestion => {
            engine.end_question(participant_id.clone()).await
        }
        ClientCommand::LeaveRoom => {
            engine.leave_room(participant_id.clone()).await
        }
    }
}

/// Writer pump: encodes queued events and sends them as text frames.
/// Ends when every sender is gone or the peer stops accepting writes.
async fn pump_events<C: Codec>(
    mut events: UnboundedReceiver<ServerEvent>,
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
) {
    while let Some(event) = events.recv().await {
        let text = match encode_text(&state.codec, &event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&text).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed, stopping pump");
            break;
        }
    }
}

/// Encodes an event and checks the codec produced valid UTF-8, since
/// the transport frames are text.
fn encode_text<C: Codec>(
    codec: &C,
    event: &ServerEvent,
) -> Result<String, QuizhallError> {
    let bytes = codec.encode(event)?;
    String::from_utf8(bytes).map_err(|_| {
        QuizhallError::Protocol(quizhall_protocol::ProtocolError::InvalidMessage(
            "codec produced non-UTF-8 output".into(),
        ))
    })
}
