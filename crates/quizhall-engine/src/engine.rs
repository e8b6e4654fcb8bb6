//! Engine actor: an isolated Tokio task that owns all room state.
//!
//! The whole registry lives in one task, communicating with connection
//! handlers through an mpsc channel. Commands are applied one at a
//! time, each to completion, so no interleaving is possible — a timer
//! expiry and a manual end for the same question are just two commands
//! in the same queue, and the second one sees the state the first one
//! left behind.

use quizhall_protocol::{ParticipantId, QuestionDraft, RoomCode};
use tokio::sync::{mpsc, oneshot};

use crate::broadcast::EventSender;
use crate::room::QuestionTimer;
use crate::session::GameSession;
use crate::EngineError;

/// Commands sent to the engine actor through its channel.
///
/// The `oneshot::Sender` in most variants is a reply channel — the
/// connection handler sends a command and awaits the outcome, then
/// translates an `Err` into an `error` event for its own client.
pub(crate) enum EngineCommand {
    CreateRoom {
        caller: ParticipantId,
        nickname: String,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    JoinRoom {
        caller: ParticipantId,
        code: RoomCode,
        nickname: String,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    AddQuestion {
        caller: ParticipantId,
        draft: QuestionDraft,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    StartQuestion {
        caller: ParticipantId,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    SubmitAnswer {
        caller: ParticipantId,
        selected_option: usize,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    EndQuestion {
        caller: ParticipantId,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    LeaveRoom {
        caller: ParticipantId,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    /// Transport-level disconnect (fire-and-forget; the connection is
    /// already gone, nobody is waiting for a reply).
    Disconnect { caller: ParticipantId },
    /// A question countdown expired (fire-and-forget, sent by the
    /// timer task the actor itself spawned).
    QuestionTimeout {
        room_code: RoomCode,
        question_index: usize,
    },
}

/// Handle to the running engine actor.
///
/// Cheap to clone — it's just an `mpsc::Sender` wrapper. Every
/// connection handler holds one.
#[derive(Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub async fn create_room(
        &self,
        caller: ParticipantId,
        nickname: String,
        sender: EventSender,
    ) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::CreateRoom {
            caller,
            nickname,
            sender,
            reply,
        })
        .await
    }

    pub async fn join_room(
        &self,
        caller: ParticipantId,
        code: RoomCode,
        nickname: String,
        sender: EventSender,
    ) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::JoinRoom {
            caller,
            code,
            nickname,
            sender,
            reply,
        })
        .await
    }

    pub async fn add_question(
        &self,
        caller: ParticipantId,
        draft: QuestionDraft,
    ) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::AddQuestion {
            caller,
            draft,
            reply,
        })
        .await
    }

    pub async fn start_question(
        &self,
        caller: ParticipantId,
    ) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::StartQuestion { caller, reply })
            .await
    }

    pub async fn submit_answer(
        &self,
        caller: ParticipantId,
        selected_option: usize,
    ) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::SubmitAnswer {
            caller,
            selected_option,
            reply,
        })
        .await
    }

    pub async fn end_question(
        &self,
        caller: ParticipantId,
    ) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::EndQuestion { caller, reply })
            .await
    }

    pub async fn leave_room(
        &self,
        caller: ParticipantId,
    ) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::LeaveRoom { caller, reply })
            .await
    }

    /// Reports a closed connection. Fire-and-forget; a send failure
    /// means the engine is already shutting down.
    pub async fn disconnect(&self, caller: ParticipantId) {
        let _ = self
            .sender
            .send(EngineCommand::Disconnect { caller })
            .await;
    }

    async fn request<F>(&self, make: F) -> Result<(), EngineError>
    where
        F: FnOnce(oneshot::Sender<Result<(), EngineError>>) -> EngineCommand,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| EngineError::Unavailable)?;
        reply_rx.await.map_err(|_| EngineError::Unavailable)?
    }
}

/// The engine actor. Owns the [`GameSession`] and a clone of its own
/// command sender, used to arm question countdowns.
struct EngineActor {
    session: GameSession,
    receiver: mpsc::Receiver<EngineCommand>,
    /// Timer tasks send their expiry back through this. Weak so the
    /// actor's own loop does not keep its channel alive after every
    /// handle is dropped.
    self_sender: mpsc::WeakSender<EngineCommand>,
}

impl EngineActor {
    /// Runs the actor loop until every handle is dropped.
    async fn run(mut self) {
        tracing::info!("engine started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                EngineCommand::CreateRoom {
                    caller,
                    nickname,
                    sender,
                    reply,
                } => {
                    let result = self.session.create_room(caller, nickname, sender);
                    let _ = reply.send(result);
                }
                EngineCommand::JoinRoom {
                    caller,
                    code,
                    nickname,
                    sender,
                    reply,
                } => {
                    let result =
                        self.session.join_room(caller, code, nickname, sender);
                    let _ = reply.send(result);
                }
                EngineCommand::AddQuestion {
                    caller,
                    draft,
                    reply,
                } => {
                    let result = self.session.add_question(&caller, draft);
                    let _ = reply.send(result);
                }
                EngineCommand::StartQuestion { caller, reply } => {
                    let result = self
                        .session
                        .start_next_question(&caller)
                        .map(|timer| self.arm_timer(timer));
                    let _ = reply.send(result);
                }
                EngineCommand::SubmitAnswer {
                    caller,
                    selected_option,
                    reply,
                } => {
                    let result =
                        self.session.submit_answer(&caller, selected_option);
                    let _ = reply.send(result);
                }
                EngineCommand::EndQuestion { caller, reply } => {
                    let result = self.session.end_question(&caller);
                    let _ = reply.send(result);
                }
                EngineCommand::LeaveRoom { caller, reply } => {
                    self.session.leave_room(&caller);
                    let _ = reply.send(Ok(()));
                }
                EngineCommand::Disconnect { caller } => {
                    self.session.disconnect(&caller);
                }
                EngineCommand::QuestionTimeout {
                    room_code,
                    question_index,
                } => {
                    self.session.question_timeout(&room_code, question_index);
                }
            }
        }

        tracing::info!("engine stopped");
    }

    /// Spawns the countdown for a freshly started question and stores
    /// its handle on the room so a manual end can abort it. The task
    /// sends its expiry back through the command channel, so it queues
    /// behind whatever the actor is doing and never interleaves.
    fn arm_timer(&mut self, request: crate::session::TimerRequest) {
        let Some(sender) = self.self_sender.upgrade() else {
            // Shutting down; the countdown would have nowhere to fire.
            return;
        };
        let room_code = request.room_code.clone();
        let question_index = request.question_index;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(request.duration).await;
            let _ = sender
                .send(EngineCommand::QuestionTimeout {
                    room_code,
                    question_index,
                })
                .await;
        });
        self.session
            .attach_timer(&request.room_code, QuestionTimer { handle });
    }
}

/// Spawns the engine actor and returns a handle to it.
///
/// `channel_size` bounds the command queue — when it fills up, callers
/// wait rather than pile on.
pub fn spawn_engine(channel_size: usize) -> EngineHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = EngineActor {
        session: GameSession::new(),
        receiver: rx,
        self_sender: tx.downgrade(),
    };

    tokio::spawn(actor.run());

    EngineHandle { sender: tx }
}
