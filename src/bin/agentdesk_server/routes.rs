//! HTTP and websocket route registration.

use super::*;

/// Uploads larger than this are rejected before they reach the handler.
const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

pub(super) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/refresh-files", get(refresh_files))
        .route("/api/select-file", get(select_file))
        .route(
            "/api/upload-files",
            post(upload_files).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/ws", get(ws_route))
        .with_state(state)
}
