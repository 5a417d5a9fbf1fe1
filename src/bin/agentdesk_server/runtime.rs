use super::*;

#[derive(Parser)]
#[command(name = "agentdesk-server")]
#[command(about = "Agent workbench backend (development)", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Directory served as the workspace
    #[arg(long, default_value = "./workspace")]
    workspace_dir: PathBuf,
}

pub(super) async fn run() -> Result<()> {
    let args = Args::parse();
    std::fs::create_dir_all(&args.workspace_dir)
        .with_context(|| format!("create workspace dir {}", args.workspace_dir.display()))?;

    let state = Arc::new(AppState {
        workspace_dir: args.workspace_dir.clone(),
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;
    let local_addr = listener.local_addr().context("read listener local addr")?;
    eprintln!("agentdesk-server listening on {}", local_addr);
    info!(addr = %local_addr, workspace = %args.workspace_dir.display(), "server started");

    if let Some(addr_file) = &args.addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
