//! Payload types for the workspace endpoints.

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct FileContentResponse {
    pub code: String,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Picks the server-provided `error` text out of a failed response body.
pub fn error_message_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.is_empty())
}
