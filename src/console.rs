use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::api::ChatApi;
use crate::errors::ClientError;
use crate::models::MessagePayload;
use crate::realtime::RealtimeConnector;
use crate::service::{ChatService, SendOutcome};
use crate::state::{ChannelState, IncomingOutcome, Notice, NoticeLevel, View, ViewMessage};

const HELP: &str = "\
Commands:
  /channels            list your channels
  /open <id|#n>        open a channel by id or list position
  /create <name>       create a channel and open it
  /members             list channel members
  /users               list users that can be added
  /select <id>...      toggle users in the add selection
  /add                 add the selected users to the channel
  /leave               leave the channel
  /back                return to the channel list
  /upload <path>       send a file
  /help                show this help
  /quit                exit
Anything else is sent as a message.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Channels,
    Open(String),
    Create(String),
    Members,
    Users,
    Select(Vec<String>),
    Add,
    Leave,
    Back,
    Upload(PathBuf),
    Help,
    Quit,
    Unknown(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Send(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match (name, arg.is_empty()) {
        ("channels", _) => Command::Channels,
        ("open", false) => Command::Open(arg.to_string()),
        ("create", false) => Command::Create(arg.to_string()),
        ("members", _) => Command::Members,
        ("users", _) => Command::Users,
        ("select", false) => Command::Select(arg.split_whitespace().map(str::to_string).collect()),
        ("add", _) => Command::Add,
        ("leave", _) => Command::Leave,
        ("back", _) => Command::Back,
        ("upload", false) => Command::Upload(PathBuf::from(arg)),
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    };
    Some(command)
}

pub fn render_message(message: &ViewMessage) -> String {
    match &message.payload {
        MessagePayload::Text(text) => format!("{}: {text}", message.sender_name),
        MessagePayload::File { url, name } => {
            let label = MessagePayload::file_label(url, name.as_deref());
            format!("{}: [file] {label} <{url}>", message.sender_name)
        }
    }
}

pub fn render_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("* {}", notice.text),
        NoticeLevel::Error => format!("! {}", notice.text),
    }
}

pub fn render_channels(state: &ChannelState) -> String {
    if state.channels.is_empty() {
        return "No channels yet".to_string();
    }
    state
        .channels
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let marker = if state.active_channel() == Some(c.id.as_str()) { '>' } else { ' ' };
            format!("{marker} #{} {} ({})", i + 1, c.name, c.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full screen for the current view.
pub fn render_view(state: &ChannelState, username: &str) -> String {
    let mut out = Vec::new();
    match &state.view {
        View::Home => {
            out.push(format!("── Your channels ── [{username}]"));
            out.push(render_channels(state));
        }
        View::Channel(_) => {
            let title = state.channel_title().unwrap_or_default();
            out.push(format!("── Channel Chat - {title} ── [{username}]"));
            out.extend(state.messages.iter().map(render_message));
        }
    }
    out.join("\n")
}

fn render_users<'a>(users: impl IntoIterator<Item = &'a crate::models::User>) -> String {
    let lines: Vec<String> = users.into_iter().map(|u| format!("  {} ({})", u.username, u.id)).collect();
    if lines.is_empty() {
        "  (none)".to_string()
    } else {
        lines.join("\n")
    }
}

/// Resolves `#n` against the channel list; anything else is taken as an id.
fn resolve_channel(state: &ChannelState, target: &str) -> Option<String> {
    match target.strip_prefix('#') {
        Some(n) => {
            let index: usize = n.parse().ok()?;
            state.channels.get(index.checked_sub(1)?).map(|c| c.id.clone())
        }
        None => Some(target.to_string()),
    }
}

fn flush_notices<A: ChatApi, R: RealtimeConnector>(chat: &mut ChatService<A, R>) {
    for notice in chat.state_mut().take_notices() {
        println!("{}", render_notice(&notice));
    }
}

/// Interactive loop: stdin commands multiplexed with real-time events.
pub async fn run<A: ChatApi, R: RealtimeConnector>(chat: &mut ChatService<A, R>) -> Result<(), ClientError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", render_view(chat.state(), chat.session().username()));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line?;
                let Some(line) = line else { break };
                let Some(command) = parse_command(&line) else { continue };
                if !execute(chat, command).await {
                    break;
                }
            }
            Some(event) = chat.next_event() => {
                if chat.handle_event(event) == IncomingOutcome::Appended {
                    if let Some(last) = chat.state().messages.last() {
                        println!("{}", render_message(last));
                    }
                }
            }
        }
        flush_notices(chat);
    }
    Ok(())
}

/// Runs one command. Returns `false` when the user asked to quit.
async fn execute<A: ChatApi, R: RealtimeConnector>(chat: &mut ChatService<A, R>, command: Command) -> bool {
    debug!("Executing {command:?}");
    let username = chat.session().username().to_string();
    match command {
        Command::Send(text) => {
            chat.state_mut().message_input = text;
            match chat.send_message().await {
                SendOutcome::Sent { .. } => {
                    if let Some(last) = chat.state().messages.last() {
                        println!("{}", render_message(last));
                    }
                }
                SendOutcome::Skipped => println!("Open a channel first (/channels, /open <id>)"),
                SendOutcome::Failed => {}
            }
        }
        Command::Channels => {
            chat.refresh_channels().await;
            println!("{}", render_channels(chat.state()));
        }
        Command::Open(target) => match resolve_channel(chat.state(), &target) {
            Some(id) => {
                chat.enter(&id).await;
                println!("{}", render_view(chat.state(), &username));
            }
            None => println!("No channel at {target}"),
        },
        Command::Create(name) => {
            chat.state_mut().channel_name_input = name;
            if let Ok(Some(_)) = chat.create_channel().await {
                println!("{}", render_view(chat.state(), &username));
            }
        }
        Command::Members => println!("Members:\n{}", render_users(&chat.state().members)),
        Command::Users => println!("Can be added:\n{}", render_users(chat.state().addable_users())),
        Command::Select(ids) => {
            for id in ids {
                match chat.state_mut().toggle_selected(&id) {
                    Some(true) => println!("selected {id}"),
                    Some(false) => println!("unselected {id}"),
                    None => println!("{id} cannot be added (see /users)"),
                }
            }
        }
        Command::Add => {
            if let Err(e) = chat.add_members().await {
                println!("{e}");
            }
        }
        Command::Leave => {
            if chat.leave_channel().await.is_ok() {
                println!("{}", render_view(chat.state(), &username));
            }
        }
        Command::Back => {
            chat.back().await;
            chat.refresh_channels().await;
            println!("{}", render_view(chat.state(), &username));
        }
        Command::Upload(path) => match chat.upload_file(&path).await {
            SendOutcome::Sent { .. } => {
                if let Some(last) = chat.state().messages.last() {
                    println!("{}", render_message(last));
                }
            }
            SendOutcome::Skipped => println!("Open a channel first (/channels, /open <id>)"),
            SendOutcome::Failed => {}
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => return false,
        Command::Unknown(line) => println!("Unknown command: {line} (try /help)"),
    }
    true
}
