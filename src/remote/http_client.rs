use super::*;

impl WorkspaceClient {
    /// Turns a non-success response into `RequestFailed`, preferring the
    /// server's `error` text over `fallback`.
    pub(super) async fn ensure_ok(
        &self,
        resp: reqwest::Response,
        label: &str,
        fallback: &str,
    ) -> ClientResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = error_message_from_body(&body).unwrap_or_else(|| fallback.to_string());
        warn!(%status, label, message = %message, "request failed");
        Err(ClientError::request_failed(message))
    }

    pub(super) fn send_error(&self, label: &str, err: reqwest::Error) -> ClientError {
        warn!(label, error = %err, "request not delivered");
        ClientError::request_failed(format!("{}: {}", label, err))
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
#[path = "../tests/remote/http_client_tests.rs"]
mod tests;
