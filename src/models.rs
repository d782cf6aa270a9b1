use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat account as the auth API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

/// Channel entry in the user's channel list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub creator: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageSender {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub username: String,
}

/// What a message carries. A message is either text or a file, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    Text(String),
    File { url: String, name: Option<String> },
}

impl MessagePayload {
    /// Label used when rendering a file attachment.
    pub fn file_label(url: &str, name: Option<&str>) -> String {
        match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => url.rsplit('/').next().unwrap_or(url).to_string(),
        }
    }
}

/// A persisted channel message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireMessage")]
pub struct Message {
    pub id: Option<String>,
    pub sender: MessageSender,
    pub payload: MessagePayload,
    pub channel_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Message as it appears on the wire: text and file fields side by side.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    sender: MessageSender,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    file_url: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default, alias = "channel")]
    channel_id: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<WireMessage> for Message {
    fn from(w: WireMessage) -> Self {
        let payload = match w.file_url {
            Some(url) if !url.is_empty() => MessagePayload::File { url, name: w.file_name },
            _ => MessagePayload::Text(w.message.unwrap_or_default()),
        };
        Self {
            id: w.id,
            sender: w.sender,
            payload,
            channel_id: w.channel_id,
            created_at: w.created_at,
        }
    }
}

// ── Response envelopes ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MessagesEnvelope {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct MembersEnvelope {
    #[serde(default)]
    pub members: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelsEnvelope {
    #[serde(default)]
    pub channels: Vec<ChannelSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelEnvelope {
    pub channel: Channel,
}

#[derive(Debug, Deserialize)]
pub struct MessageEnvelope {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub status: bool,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

// ── Request bodies ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NewChannel {
    pub name: String,
    pub creator: Vec<String>,
}

/// Body shared by add-member and leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipChange {
    pub channel_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub channel_id: String,
    pub sender_id: String,
    pub message: String,
}

/// A file attachment ready for the multipart upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub channel_id: String,
    pub sender_id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// ── Real-time events ──────────────────────────────────────────────────────────

/// Events the client emits on the socket.
/// Frames look like `{ "event": "join-channel", "data": "<channel id>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinChannel(String),
    SendChannelMessage(NewMessage),
}

/// A peer's message relayed by the socket server. Carries no message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBroadcast {
    pub sender_id: String,
    pub message: String,
}

/// Events the socket server pushes to channel subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    ChannelMessage(ChannelBroadcast),
}
