use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use tracing::{debug, info, warn};

use agentdesk::model::WorkspaceNode;

#[path = "agentdesk_server/http_error.rs"]
mod http_error;
use self::http_error::*;
#[path = "agentdesk_server/validators.rs"]
mod validators;
use self::validators::*;
#[path = "agentdesk_server/folder.rs"]
mod folder;
use self::folder::*;
#[path = "agentdesk_server/handlers_files.rs"]
mod handlers_files;
use self::handlers_files::*;
#[path = "agentdesk_server/handlers_ws.rs"]
mod handlers_ws;
use self::handlers_ws::*;
#[path = "agentdesk_server/routes.rs"]
mod routes;
use self::routes::*;
#[path = "agentdesk_server/runtime.rs"]
mod runtime;

#[derive(Clone)]
struct AppState {
    workspace_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    agentdesk::logging::init("info");
    if let Err(err) = runtime::run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
