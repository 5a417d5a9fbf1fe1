use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use agentdesk::config::ClientConfig;
use agentdesk::model::UploadFile;
use agentdesk::session::{Intent, Session};
use agentdesk::settings::{SettingsStore, parse_assignments, requires_reinitialize};
use agentdesk::state::{AppState, ChatMessage, NotificationLevel, Sender};
use agentdesk::store::FileStore;

use crate::SettingsCommands;

pub(super) fn handle_settings_command(config: &ClientConfig, command: SettingsCommands) -> Result<()> {
    let mut store = SettingsStore::new(FileStore::open(config.settings_path.clone()));
    match command {
        SettingsCommands::Show { json } => {
            let current = store.current();
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&current).context("serialize settings json")?
                );
            } else {
                println!("LLM_MODEL: {}", current.llm_model);
                println!("AGENT: {}", current.agent);
                println!("LANGUAGE: {}", current.language);
            }
        }
        SettingsCommands::Set { pairs } => {
            let raw = parse_assignments(pairs.iter().map(String::as_str))?;
            let patch = store.pending_changes(&raw);
            store.save(&raw).context("save settings")?;
            if patch.is_empty() {
                println!("Settings unchanged");
            } else {
                for (key, value) in &patch {
                    println!("{} = {}", key, value);
                }
                if requires_reinitialize(&patch) {
                    println!("Agent will be re-initialized on the next chat session");
                }
            }
        }
    }
    Ok(())
}

pub(super) async fn handle_tree(config: ClientConfig, json: bool) -> Result<()> {
    let mut session = Session::new(config)?;
    session.refresh();
    session.settle().await;
    bail_on_errors(session.state())?;

    let tree = session
        .state()
        .active_tree()
        .context("no listing received for the workspace folder")?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(tree).context("serialize tree json")?
        );
    } else {
        for path in tree.file_paths() {
            println!("{}", path);
        }
    }
    Ok(())
}

pub(super) async fn handle_upload(config: ClientConfig, files: &[PathBuf]) -> Result<()> {
    let uploads = read_uploads(files)?;
    let count = uploads.len();
    let mut session = Session::new(config)?;
    session.upload(uploads);
    session.settle().await;
    bail_on_errors(session.state())?;

    println!("Uploaded {} file(s)", count);
    if let Some(tree) = session.state().active_tree() {
        for path in tree.file_paths() {
            println!("{}", path);
        }
    }
    Ok(())
}

pub(super) async fn handle_open(config: ClientConfig, path: &str) -> Result<()> {
    let mut session = Session::new(config)?;
    session.open(path);
    session.settle().await;
    bail_on_errors(session.state())?;

    let opened = session
        .state()
        .opened_file()
        .context("no content received")?;
    print!("{}", opened.code);
    Ok(())
}

pub(super) async fn handle_chat(config: ClientConfig) -> Result<()> {
    let mut session = Session::new(config)?;
    if let Err(err) = session.start().await {
        anyhow::bail!("connect {}: {}", session.config().ws_url, err.user_message());
    }
    eprintln!(
        "Connected to {}. Type a message, or /refresh, /folder NAME, /open PATH, /set KEY=VALUE.., /quit",
        session.config().ws_url
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_intent(&line) {
                Ok(Some(intent)) => {
                    let quit = intent == Intent::Quit;
                    if tx.send(intent).is_err() || quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => eprintln!("{:#}", err),
            }
        }
    });

    let mut printed = 0usize;
    session
        .run(rx, |state| print_updates(state, &mut printed))
        .await;
    session.close();
    reader.abort();
    Ok(())
}

/// Maps one input line to an intent. Blank lines map to nothing.
pub(super) fn parse_intent(line: &str) -> Result<Option<Intent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Some(Intent::SendMessage(line.to_string())));
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(n, r)| (n, r.trim()))
        .unwrap_or((command, ""));
    let intent = match name {
        "quit" | "exit" => Intent::Quit,
        "refresh" => Intent::Refresh,
        "folder" => Intent::SetFolder(rest.to_string()),
        "open" if !rest.is_empty() => Intent::Open(rest.to_string()),
        "set" if !rest.is_empty() => {
            Intent::ApplySettings(parse_assignments(rest.split_whitespace())?)
        }
        "open" | "set" => anyhow::bail!("/{} needs an argument", name),
        other => anyhow::bail!("unknown command /{}", other),
    };
    Ok(Some(intent))
}

fn read_uploads(files: &[PathBuf]) -> Result<Vec<UploadFile>> {
    files
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| format!("{} has no file name", path.display()))?;
            let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
            Ok(UploadFile::new(name, bytes))
        })
        .collect()
}

fn bail_on_errors(state: &AppState) -> Result<()> {
    if let Some(n) = state
        .notifications()
        .iter()
        .find(|n| n.level == NotificationLevel::Error)
    {
        anyhow::bail!("{}", n.message);
    }
    Ok(())
}

fn print_updates(state: &mut AppState, printed: &mut usize) {
    for message in &state.messages()[*printed..] {
        // The user's own lines are already on screen.
        if message.sender != Sender::User {
            println!("{}", format_message(message));
        }
    }
    *printed = state.messages().len();

    for n in state.take_notifications() {
        match n.level {
            NotificationLevel::Error => eprintln!("! {}", n.message),
            NotificationLevel::Info => eprintln!("- {}", n.message),
        }
    }
}

fn format_message(message: &ChatMessage) -> String {
    let who = match message.sender {
        Sender::User => "you",
        Sender::Agent => "agent",
        Sender::Observation => "observation",
        Sender::System => "system",
    };
    match &message.tag {
        Some(tag) => format!("[{}:{}] {}", who, tag, message.content),
        None => format!("[{}] {}", who, message.content),
    }
}

#[cfg(test)]
#[path = "tests/cli_exec/intent_tests.rs"]
mod tests;
