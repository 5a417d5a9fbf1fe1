use super::*;

pub(super) async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct SubdirQuery {
    #[serde(default)]
    workspace_subdir: String,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct SelectFileQuery {
    file: String,
}

pub(super) async fn refresh_files(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SubdirQuery>,
) -> Response {
    if let Err(err) = validate_relative_path(&q.workspace_subdir) {
        return bad_request(err);
    }
    let dir = state.workspace_dir.join(&q.workspace_subdir);
    if !dir.is_dir() {
        return not_found(&format!("folder not found: {}", q.workspace_subdir));
    }
    match folder_structure(&dir) {
        Ok(root) => {
            debug!(subdir = %q.workspace_subdir, "listed workspace folder");
            Json(root).into_response()
        }
        Err(err) => internal_error(err),
    }
}

pub(super) async fn select_file(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SelectFileQuery>,
) -> Response {
    if let Err(err) = validate_relative_path(&q.file) {
        return bad_request(err);
    }
    let path = state.workspace_dir.join(&q.file);
    if !path.is_file() {
        return not_found(&format!("file not found: {}", q.file));
    }
    match std::fs::read(&path) {
        Ok(bytes) => {
            let code = String::from_utf8_lossy(&bytes).into_owned();
            Json(serde_json::json!({"code": code})).into_response()
        }
        Err(err) => internal_error(anyhow::Error::new(err).context(format!("read {}", q.file))),
    }
}

pub(super) async fn upload_files(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SubdirQuery>,
    mut multipart: Multipart,
) -> Response {
    if let Err(err) = validate_relative_path(&q.workspace_subdir) {
        return bad_request(err);
    }
    let dir = state.workspace_dir.join(&q.workspace_subdir);
    if let Err(err) = std::fs::create_dir_all(&dir) {
        return internal_error(anyhow::Error::new(err).context("create upload folder"));
    }

    let mut stored = 0usize;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return bad_request(anyhow::anyhow!("invalid multipart body: {}", err)),
        };
        if field.name() != Some("files") {
            debug!(field = ?field.name(), "skipping multipart field");
            continue;
        }
        let Some(name) = field.file_name().map(str::to_string) else {
            return bad_request(anyhow::anyhow!("file part is missing a file name"));
        };
        if let Err(err) = validate_file_name(&name) {
            return bad_request(err);
        }
        let bytes = match field.bytes().await {
            Ok(b) => b,
            Err(err) => return bad_request(anyhow::anyhow!("read file part {}: {}", name, err)),
        };
        if let Err(err) = std::fs::write(dir.join(&name), &bytes) {
            return internal_error(anyhow::Error::new(err).context(format!("write {}", name)));
        }
        stored += 1;
    }

    info!(subdir = %q.workspace_subdir, files = stored, "files uploaded");
    Json(serde_json::json!({})).into_response()
}
