use super::*;

fn initialized() -> EchoAgent {
    let mut agent = EchoAgent::default();
    agent.handle_frame(r#"{"action":"initialize","args":{"model":"m","agent_cls":"a"}}"#);
    agent
}

#[test]
fn initialize_replies_with_control_loop_message() {
    let mut agent = EchoAgent::default();
    let out = agent.handle_frame(r#"{"action":"initialize","args":{}}"#);
    assert_eq!(
        out,
        vec![json!({"action": "initialize", "message": "Control loop started."})]
    );
}

#[test]
fn start_echoes_task_in_order() {
    let mut agent = initialized();
    let out = agent.handle_frame(r#"{"action":"start","args":{"task":"list files"}}"#);

    assert_eq!(out.len(), 4);
    assert_eq!(out[0]["message"], "Starting new task...");
    assert_eq!(out[1]["args"]["agent_state"], "running");
    assert_eq!(out[2]["action"], "message");
    assert_eq!(out[2]["message"], "You said: list files");
    assert_eq!(out[3]["action"], "finish");
}

#[test]
fn start_before_initialize_is_refused() {
    let mut agent = EchoAgent::default();
    let out = agent.handle_frame(r#"{"action":"start","args":{"task":"x"}}"#);
    assert_eq!(out.len(), 2);
    assert_eq!(out[1], json!({"error": true, "message": NOT_STARTED}));
}

#[test]
fn malformed_frames_get_error_replies() {
    let mut agent = initialized();
    assert_eq!(agent.handle_frame("{nope")[0]["message"], "Invalid JSON");
    assert_eq!(agent.handle_frame(r#"{"args":{}}"#)[0]["message"], "Invalid event");
    assert_eq!(
        agent.handle_frame(r#"{"action":"start","args":{}}"#)[0]["message"],
        "No task specified"
    );
    assert_eq!(
        agent.handle_frame(r#"{"action":"dance"}"#)[0]["message"],
        "I didn't recognize this action:dance"
    );
}

#[test]
fn chat_is_accepted_silently() {
    let mut agent = initialized();
    assert!(agent.handle_frame(r#"{"action":"chat","message":"hi"}"#).is_empty());
}
