use tracing::debug;
use uuid::Uuid;

use crate::models::{ChannelBroadcast, ChannelSummary, Message, MessagePayload, User};

/// Which screen the client is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Home,
    Channel(String),
}

/// A row of the rendered message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewMessage {
    /// Server id, or `local-<uuid>` when the message arrived without one.
    pub key: String,
    pub sender_name: String,
    pub payload: MessagePayload,
}

impl ViewMessage {
    fn local_key() -> String {
        format!("local-{}", Uuid::new_v4())
    }
}

impl From<Message> for ViewMessage {
    fn from(m: Message) -> Self {
        Self {
            key: m.id.unwrap_or_else(ViewMessage::local_key),
            sender_name: m.sender.username,
            payload: m.payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-facing alert raised by a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

/// What happened to a relayed peer message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingOutcome {
    Appended,
    /// Sent by the local user; already shown through the send path.
    OwnEcho,
    /// Sender is not in the loaded member list.
    UnknownSender,
}

/// In-memory view state: the four replicas plus the form inputs.
#[derive(Debug, Clone)]
pub struct ChannelState {
    pub view: View,
    pub messages: Vec<ViewMessage>,
    pub members: Vec<User>,
    pub channels: Vec<ChannelSummary>,
    pub all_users: Vec<User>,

    // ── Form inputs ──────────────────────────────────────────────────────────
    pub message_input: String,
    pub channel_name_input: String,
    /// Add-member selection, in the order the user picked it.
    pub selected_members: Vec<String>,

    notices: Vec<Notice>,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            view: View::Home,
            messages: Vec::new(),
            members: Vec::new(),
            channels: Vec::new(),
            all_users: Vec::new(),
            message_input: String::new(),
            channel_name_input: String::new(),
            selected_members: Vec::new(),
            notices: Vec::new(),
        }
    }
}

impl ChannelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_channel(&self) -> Option<&str> {
        match &self.view {
            View::Channel(id) => Some(id),
            View::Home => None,
        }
    }

    /// Channel name from the channel list, or the raw id when it is not listed.
    pub fn channel_title(&self) -> Option<String> {
        let id = self.active_channel()?;
        let title = self
            .channels
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string());
        Some(title)
    }

    pub fn replace_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages.into_iter().map(ViewMessage::from).collect();
    }

    pub fn append_message(&mut self, message: Message) {
        self.messages.push(ViewMessage::from(message));
    }

    /// Applies a relayed peer message.
    ///
    /// Events from `self_id` are dropped; the send path already appended them.
    /// The display name comes from the current member list and events from
    /// senders outside it are dropped.
    pub fn apply_incoming(&mut self, event: &ChannelBroadcast, self_id: &str) -> IncomingOutcome {
        let Some(sender) = self.members.iter().find(|m| m.id == event.sender_id) else {
            debug!("Dropping message from {} who is not a loaded member", event.sender_id);
            return IncomingOutcome::UnknownSender;
        };
        if event.sender_id == self_id {
            return IncomingOutcome::OwnEcho;
        }

        self.messages.push(ViewMessage {
            key: ViewMessage::local_key(),
            sender_name: sender.username.clone(),
            payload: MessagePayload::Text(event.message.clone()),
        });
        IncomingOutcome::Appended
    }

    /// Users that are not yet members of the open channel.
    pub fn addable_users(&self) -> Vec<&User> {
        self.all_users
            .iter()
            .filter(|u| !self.members.iter().any(|m| m.id == u.id))
            .collect()
    }

    pub fn is_addable(&self, user_id: &str) -> bool {
        self.addable_users().iter().any(|u| u.id == user_id)
    }

    /// Toggles a user in the add-member selection. Returns whether it is now
    /// selected, or `None` when the user is unknown or already a member.
    pub fn toggle_selected(&mut self, user_id: &str) -> Option<bool> {
        if let Some(pos) = self.selected_members.iter().position(|id| id == user_id) {
            self.selected_members.remove(pos);
            return Some(false);
        }
        if !self.is_addable(user_id) {
            return None;
        }
        self.selected_members.push(user_id.to_string());
        Some(true)
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
