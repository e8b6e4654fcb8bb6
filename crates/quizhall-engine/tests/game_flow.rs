//! End-to-end tests for the engine actor: commands go through the
//! [`EngineHandle`] exactly as the connection handlers send them, and
//! events come back through per-participant channels.
//!
//! Timer tests run with the clock paused (`start_paused = true`), so
//! countdowns fire deterministically the moment the runtime goes idle.

use std::time::Duration;

use quizhall_engine::{spawn_engine, EngineError, EngineHandle};
use quizhall_protocol::{
    ParticipantId, QuestionDraft, QuestionKind, RoomCode, ServerEvent,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};

fn pid(s: &str) -> ParticipantId {
    ParticipantId(s.into())
}

fn draft(seconds: u64) -> QuestionDraft {
    QuestionDraft {
        text: "Smallest prime?".into(),
        kind: QuestionKind::Multiple,
        options: vec!["1".into(), "2".into(), "3".into()],
        correct_option_index: 1,
        time_limit_seconds: seconds,
        points: 100,
    }
}

fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        events.push(ev);
    }
    events
}

/// Creates a room with moderator "mod" and joins player "ada".
/// Returns the room code and the two event receivers.
async fn two_person_room(
    engine: &EngineHandle,
) -> (RoomCode, UnboundedReceiver<ServerEvent>, UnboundedReceiver<ServerEvent>) {
    let (mod_tx, mut mod_rx) = mpsc::unbounded_channel();
    engine
        .create_room(pid("mod"), "quinn".into(), mod_tx)
        .await
        .expect("create room");
    let code = match mod_rx.recv().await.expect("roomCreated") {
        ServerEvent::RoomCreated { room, .. } => room.code,
        other => panic!("expected roomCreated, got {other:?}"),
    };

    let (ada_tx, mut ada_rx) = mpsc::unbounded_channel();
    engine
        .join_room(pid("ada"), code.clone(), "ada".into(), ada_tx)
        .await
        .expect("join room");
    // Wait for the join roomcast so both channels start quiet.
    match ada_rx.recv().await.expect("roomJoined") {
        ServerEvent::RoomJoined { .. } => {}
        other => panic!("expected roomJoined, got {other:?}"),
    }
    drain(&mut mod_rx);
    drain(&mut ada_rx);

    (code, mod_rx, ada_rx)
}

#[tokio::test]
async fn test_full_game_flow_through_the_handle() {
    let engine = spawn_engine(32);
    let (_code, mut mod_rx, mut ada_rx) = two_person_room(&engine).await;

    engine
        .add_question(pid("mod"), draft(30))
        .await
        .expect("add question");
    engine
        .start_question(pid("mod"))
        .await
        .expect("start question");
    engine
        .submit_answer(pid("ada"), 1)
        .await
        .expect("submit answer");
    engine
        .end_question(pid("mod"))
        .await
        .expect("end question");

    // One question total, so ending it finishes the game.
    let events = drain(&mut ada_rx);
    assert!(matches!(&events[0], ServerEvent::QuestionStarted { time_limit: 30, .. }));
    assert!(matches!(&events[1], ServerEvent::AnswerSubmitted { .. }));
    match &events[2] {
        ServerEvent::AnswerResult { answer } => assert!(answer.is_correct),
        other => panic!("expected answerResult, got {other:?}"),
    }
    match &events[3] {
        ServerEvent::GameFinished { final_scores } => {
            assert_eq!(final_scores[0].nickname, "ada");
            assert_eq!(final_scores[0].score, 100);
        }
        other => panic!("expected gameFinished, got {other:?}"),
    }

    // The moderator never sees the scored result, only the summary.
    let events = drain(&mut mod_rx);
    assert!(events
        .iter()
        .all(|ev| !matches!(ev, ServerEvent::AnswerResult { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_countdown_ends_the_question_on_its_own() {
    let engine = spawn_engine(32);
    let (_code, _mod_rx, mut ada_rx) = two_person_room(&engine).await;

    engine.add_question(pid("mod"), draft(10)).await.expect("add");
    engine.add_question(pid("mod"), draft(10)).await.expect("add");
    engine.start_question(pid("mod")).await.expect("start");

    match ada_rx.recv().await.expect("questionStarted") {
        ServerEvent::QuestionStarted { time_limit, .. } => {
            assert_eq!(time_limit, 10)
        }
        other => panic!("expected questionStarted, got {other:?}"),
    }

    // Nothing else to do: the paused clock jumps to the deadline and
    // the countdown ends the question without any moderator action.
    match ada_rx.recv().await.expect("questionEnded") {
        ServerEvent::QuestionEnded { scores, .. } => {
            assert_eq!(scores.len(), 2)
        }
        other => panic!("expected questionEnded, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_manual_end_cancels_the_countdown() {
    let engine = spawn_engine(32);
    let (_code, _mod_rx, mut ada_rx) = two_person_room(&engine).await;

    engine.add_question(pid("mod"), draft(10)).await.expect("add");
    engine.add_question(pid("mod"), draft(10)).await.expect("add");
    engine.start_question(pid("mod")).await.expect("start");
    engine.end_question(pid("mod")).await.expect("end");

    let events = drain(&mut ada_rx);
    let ended = events
        .iter()
        .filter(|ev| matches!(ev, ServerEvent::QuestionEnded { .. }))
        .count();
    assert_eq!(ended, 1);

    // Sail far past the original deadline; the aborted countdown must
    // not produce a second questionEnded.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(drain(&mut ada_rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_countdown_dies_with_its_room() {
    let engine = spawn_engine(32);
    let (_code, _mod_rx, mut ada_rx) = two_person_room(&engine).await;

    engine.add_question(pid("mod"), draft(10)).await.expect("add");
    engine.start_question(pid("mod")).await.expect("start");
    match ada_rx.recv().await.expect("questionStarted") {
        ServerEvent::QuestionStarted { .. } => {}
        other => panic!("expected questionStarted, got {other:?}"),
    }

    // Moderator vanishes mid-question: the room is torn down and the
    // countdown must not resurrect it.
    engine.disconnect(pid("mod")).await;
    match ada_rx.recv().await.expect("error") {
        ServerEvent::Error { message } => {
            assert!(message.contains("disconnected"))
        }
        other => panic!("expected error, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(drain(&mut ada_rx).is_empty());
}

#[tokio::test]
async fn test_rejection_carries_the_engine_error() {
    let engine = spawn_engine(32);
    let (_code, _mod_rx, _ada_rx) = two_person_room(&engine).await;

    let err = engine
        .add_question(pid("ada"), draft(10))
        .await
        .expect_err("players cannot author questions");
    assert!(matches!(err, EngineError::Forbidden));

    let err = engine
        .start_question(pid("mod"))
        .await
        .expect_err("no questions yet");
    assert!(matches!(err, EngineError::NoQuestions));
}

#[tokio::test]
async fn test_two_rooms_do_not_hear_each_other() {
    let engine = spawn_engine(32);

    let (a_tx, mut a_rx) = mpsc::unbounded_channel();
    engine
        .create_room(pid("mod-a"), "ana".into(), a_tx)
        .await
        .expect("create room a");
    let (b_tx, mut b_rx) = mpsc::unbounded_channel();
    engine
        .create_room(pid("mod-b"), "ben".into(), b_tx)
        .await
        .expect("create room b");
    drain(&mut a_rx);
    drain(&mut b_rx);

    engine
        .add_question(pid("mod-a"), draft(30))
        .await
        .expect("add");
    assert!(matches!(
        a_rx.recv().await,
        Some(ServerEvent::QuestionAdded { .. })
    ));
    engine.start_question(pid("mod-a")).await.expect("start");

    assert!(matches!(
        a_rx.recv().await,
        Some(ServerEvent::QuestionStarted { .. })
    ));
    assert!(drain(&mut b_rx).is_empty());
}
