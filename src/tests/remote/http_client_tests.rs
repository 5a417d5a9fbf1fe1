use super::*;

#[test]
fn error_field_is_preferred() {
    assert_eq!(
        error_message_from_body(r#"{"error":"disk full"}"#).as_deref(),
        Some("disk full")
    );
}

#[test]
fn missing_or_empty_error_falls_back() {
    assert_eq!(error_message_from_body(r#"{"detail":"x"}"#), None);
    assert_eq!(error_message_from_body(r#"{"error":""}"#), None);
    assert_eq!(error_message_from_body("<html>502</html>"), None);
}

#[test]
fn url_joins_base_without_double_slash() {
    let client = WorkspaceClient::new("http://127.0.0.1:3000/").unwrap();
    assert_eq!(
        client.url("/api/refresh-files"),
        "http://127.0.0.1:3000/api/refresh-files"
    );
}
