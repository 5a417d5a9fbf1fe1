use super::*;
use crate::state::Sender;

fn frame(text: &str) -> TransportEvent {
    TransportEvent::Frame {
        conn: 0,
        text: text.to_string(),
    }
}

fn transport() -> ChatTransport {
    ChatTransport::new("ws://127.0.0.1:9/ws")
}

#[tokio::test]
async fn inbound_events_apply_in_receipt_order() {
    let mut t = transport();
    let mut app = AppState::default();

    t.inject(frame(r#"{"action":"change_agent_state","args":{"agent_state":"running"}}"#));
    t.inject(frame(r#"{"action":"run","args":{"command":"ls"},"message":"Running ls"}"#));
    t.inject(frame(r#"{"observation":"run","content":"a.txt"}"#));

    let first = t.next_event().await.unwrap();
    t.apply(&mut app, first);
    assert_eq!(app.agent_status(), &AgentStatus::Running);
    assert!(app.messages().is_empty());

    for _ in 0..2 {
        let ev = t.next_event().await.unwrap();
        t.apply(&mut app, ev);
    }
    let got: Vec<(Sender, &str)> = app
        .messages()
        .iter()
        .map(|m| (m.sender, m.content.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![(Sender::Agent, "Running ls"), (Sender::Observation, "a.txt")]
    );
}

#[test]
fn send_while_disconnected_keeps_message_and_fails() {
    let mut t = transport();
    let mut app = AppState::default();

    let err = t.send_user_message(&mut app, "hi").unwrap_err();

    assert!(matches!(err, ClientError::TransportSendFailed(_)));
    assert_eq!(app.messages().len(), 1);
    assert_eq!(app.messages()[0].content, "hi");
    assert_eq!(app.messages()[0].sender, Sender::User);
    assert_eq!(app.notifications().len(), 1);

    t.send_user_message(&mut app, "again").unwrap_err();
    assert_eq!(app.messages().len(), 2);
}

#[test]
fn connected_without_socket_refuses_send() {
    let mut t = transport();
    t.force_state(ConnectionState::Connected);
    let err = t.send_event(&ChatEvent::start("x")).unwrap_err();
    assert!(matches!(err, ClientError::TransportSendFailed(_)));
}

#[test]
fn unknown_frames_leave_state_untouched() {
    let mut t = transport();
    let mut app = AppState::default();
    let before = app.revision();

    t.apply(&mut app, frame(r#"{"action":"teleport","args":{}}"#));
    t.apply(&mut app, frame("definitely not json"));

    assert_eq!(app.revision(), before);
}

#[test]
fn close_event_disconnects_and_notifies() {
    let mut t = transport();
    let mut app = AppState::default();
    t.force_state(ConnectionState::Connected);

    t.apply(
        &mut app,
        TransportEvent::Closed {
            conn: 0,
            reason: Some("bye".into()),
        },
    );

    assert_eq!(t.state(), ConnectionState::Disconnected);
    assert_eq!(app.connection(), ConnectionState::Disconnected);
    assert_eq!(app.notifications()[0].message, "Connection closed: bye");
}

#[test]
fn events_after_close_event_are_ignored() {
    let mut t = transport();
    let mut app = AppState::default();
    t.force_state(ConnectionState::Connected);

    t.apply(&mut app, TransportEvent::Closed { conn: 0, reason: None });
    t.apply(&mut app, frame(r#"{"action":"message","message":"late"}"#));
    t.apply(
        &mut app,
        TransportEvent::Failed {
            conn: 0,
            reason: "reset".into(),
        },
    );

    assert_eq!(t.state(), ConnectionState::Disconnected);
    assert!(app.messages().is_empty());
    assert_eq!(app.notifications().len(), 1);
    assert_eq!(app.notifications()[0].message, "Connection closed");
}

#[test]
fn events_after_failure_are_ignored() {
    let mut t = transport();
    let mut app = AppState::default();
    t.force_state(ConnectionState::Connected);

    t.apply(
        &mut app,
        TransportEvent::Failed {
            conn: 0,
            reason: "bad frame".into(),
        },
    );
    t.apply(&mut app, frame(r#"{"action":"message","message":"late"}"#));
    t.apply(&mut app, TransportEvent::Closed { conn: 0, reason: None });

    assert_eq!(t.state(), ConnectionState::Failed);
    assert!(app.messages().is_empty());
    assert_eq!(app.notifications().len(), 1);
}

#[test]
fn events_from_old_connection_are_ignored() {
    let mut t = transport();
    let mut app = AppState::default();
    t.close(&mut app);
    let before = app.revision();

    t.apply(&mut app, frame(r#"{"message":"late"}"#));

    assert_eq!(app.revision(), before);
    assert!(app.messages().is_empty());
}

#[tokio::test]
async fn failed_transport_is_terminal() {
    let mut t = transport();
    let mut app = AppState::default();
    t.force_state(ConnectionState::Connected);

    t.apply(
        &mut app,
        TransportEvent::Failed {
            conn: 0,
            reason: "bad frame".into(),
        },
    );
    assert_eq!(t.state(), ConnectionState::Failed);

    let err = t.connect(&mut app).await.unwrap_err();
    assert!(matches!(err, ClientError::Connect(_)));
    assert_eq!(t.state(), ConnectionState::Failed);
}

#[test]
fn dispatch_initialize_and_finish() {
    let mut app = AppState::default();
    dispatch(
        &mut app,
        InboundEvent::Initialized {
            message: Some("Control loop started.".into()),
        },
    );
    assert_eq!(app.agent_status(), &AgentStatus::Initialized);
    assert_eq!(app.messages()[0].sender, Sender::System);

    dispatch(
        &mut app,
        InboundEvent::Finished {
            message: Some("done".into()),
        },
    );
    assert_eq!(app.agent_status(), &AgentStatus::Finished);
    assert_eq!(app.messages()[1].tag.as_deref(), Some("finish"));
}

#[test]
fn server_error_becomes_notification_only() {
    let mut app = AppState::default();
    dispatch(
        &mut app,
        InboundEvent::Error {
            message: "No task specified".into(),
        },
    );
    assert!(app.messages().is_empty());
    assert_eq!(app.notifications()[0].message, "No task specified");
}
