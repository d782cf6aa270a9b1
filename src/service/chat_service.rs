use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::api::ChatApi;
use crate::errors::ClientError;
use crate::models::{Channel, FileUpload, MembershipChange, NewChannel, NewMessage, ServerEvent};
use crate::realtime::{ChannelSubscription, RealtimeConnector};
use crate::session::Session;
use crate::state::{ChannelState, IncomingOutcome, Notice, View};

/// Result of a send or upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing to send, or no channel open.
    Skipped,
    /// Persisted and shown locally. `announced` tells whether peers were notified.
    Sent { announced: bool },
    /// The write failed; local state is unchanged.
    Failed,
}

/// Outcome of adding a batch of members one call at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddMembersReport {
    pub added: Vec<String>,
    /// The id whose call failed, with the error text.
    pub failed: Option<(String, String)>,
    /// Ids never attempted because an earlier call failed.
    pub skipped: Vec<String>,
}

impl AddMembersReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

/// Drives one user's chat view: replicas, form inputs and the channel subscription.
pub struct ChatService<A: ChatApi, R: RealtimeConnector> {
    api: A,
    connector: R,
    session: Session,
    state: ChannelState,
    subscription: Option<ChannelSubscription<R::Connection>>,
}

impl<A: ChatApi, R: RealtimeConnector> ChatService<A, R> {
    pub fn new(api: A, connector: R, session: Session) -> Self {
        Self { api, connector, session, state: ChannelState::new(), subscription: None }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    /// Form inputs are edited through this.
    pub fn state_mut(&mut self) -> &mut ChannelState {
        &mut self.state
    }

    pub fn subscribed_channel(&self) -> Option<&str> {
        self.subscription.as_ref().map(|s| s.channel_id())
    }

    /// Initial load: the user directory, then either a channel or the home list.
    pub async fn mount(&mut self, channel_id: Option<&str>) {
        self.refresh_users().await;
        match channel_id {
            Some(id) => self.enter(id).await,
            None => self.refresh_channels().await,
        }
    }

    /// Opens a channel view. Any previous subscription is released first.
    pub async fn enter(&mut self, channel_id: &str) {
        self.release_subscription().await;
        self.state.view = View::Channel(channel_id.to_string());

        self.refresh_messages().await;
        self.refresh_members().await;
        self.refresh_channels().await;

        match ChannelSubscription::join(&self.connector, channel_id).await {
            Ok(sub) => self.subscription = Some(sub),
            Err(e) => warn!("Real-time updates unavailable for channel {channel_id}: {e}"),
        }
    }

    /// Leaves the channel view without leaving the channel.
    pub async fn back(&mut self) {
        self.release_subscription().await;
        self.state.view = View::Home;
        self.state.messages.clear();
        self.state.members.clear();
    }

    /// Releases the subscription and hands the session back.
    pub async fn close(mut self) -> Session {
        self.release_subscription().await;
        self.session
    }

    async fn release_subscription(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.release().await;
        }
    }

    // ── Replicas ──────────────────────────────────────────────────────────────

    pub async fn refresh_users(&mut self) {
        match self.api.list_users_except(self.session.user_id()).await {
            Ok(users) => self.state.all_users = users,
            Err(e) => error!("Error fetching users: {e}"),
        }
    }

    pub async fn refresh_messages(&mut self) {
        let Some(channel_id) = self.state.active_channel().map(str::to_string) else { return };
        match self.api.channel_messages(&channel_id).await {
            Ok(messages) => self.state.replace_messages(messages),
            Err(e) => error!("Error fetching messages for {channel_id}: {e}"),
        }
    }

    pub async fn refresh_members(&mut self) {
        let Some(channel_id) = self.state.active_channel().map(str::to_string) else { return };
        match self.api.channel_members(&channel_id).await {
            Ok(members) => self.state.members = members,
            Err(e) => error!("Error fetching members for {channel_id}: {e}"),
        }
    }

    pub async fn refresh_channels(&mut self) {
        match self.api.user_channels(self.session.user_id()).await {
            Ok(channels) => self.state.channels = channels,
            Err(e) => error!("Error fetching channels: {e}"),
        }
    }

    // ── Messages ──────────────────────────────────────────────────────────────

    /// Sends the message input: persist over REST, show it, then announce it.
    /// On failure nothing changes and the input is kept.
    pub async fn send_message(&mut self) -> SendOutcome {
        let text = self.state.message_input.trim().to_string();
        if text.is_empty() {
            return SendOutcome::Skipped;
        }
        let Some(channel_id) = self.state.active_channel().map(str::to_string) else {
            return SendOutcome::Skipped;
        };

        let body = NewMessage { channel_id, sender_id: self.session.user_id().to_string(), message: text };
        let saved = match self.api.send_message(&body).await {
            Ok(message) => message,
            Err(e) => {
                error!("Error sending message: {e}");
                return SendOutcome::Failed;
            }
        };

        self.state.append_message(saved);
        let announced = match self.subscription.as_mut() {
            Some(sub) => match sub.announce(&body).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Message persisted but not announced: {e}");
                    false
                }
            },
            None => {
                warn!("Message persisted but no real-time channel is joined");
                false
            }
        };
        self.state.message_input.clear();
        SendOutcome::Sent { announced }
    }

    /// Uploads a file as a message. File messages are shown locally only and
    /// are not announced on the real-time channel.
    pub async fn upload_file(&mut self, path: &Path) -> SendOutcome {
        let Some(channel_id) = self.state.active_channel().map(str::to_string) else {
            return SendOutcome::Skipped;
        };

        let upload = match read_upload(path, channel_id, self.session.user_id()).await {
            Ok(upload) => upload,
            Err(e) => {
                error!("Upload error: {e}");
                return SendOutcome::Failed;
            }
        };

        match self.api.upload_file(upload).await {
            Ok(message) => {
                self.state.append_message(message);
                SendOutcome::Sent { announced: false }
            }
            Err(e) => {
                error!("Upload error: {e}");
                SendOutcome::Failed
            }
        }
    }

    /// Waits for the next real-time event. Never resolves while no channel is joined.
    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        let Some(sub) = self.subscription.as_mut() else {
            return std::future::pending().await;
        };
        let event = sub.next_event().await;
        if event.is_none() {
            warn!("Real-time channel {} closed", sub.channel_id());
            self.subscription = None;
        }
        event
    }

    pub fn handle_event(&mut self, event: ServerEvent) -> IncomingOutcome {
        match event {
            ServerEvent::ChannelMessage(broadcast) => {
                self.state.apply_incoming(&broadcast, self.session.user_id())
            }
        }
    }

    // ── Roster ────────────────────────────────────────────────────────────────

    /// Creates a channel from the name input and opens it.
    pub async fn create_channel(&mut self) -> Result<Option<Channel>, ClientError> {
        let name = self.state.channel_name_input.trim().to_string();
        if name.is_empty() {
            return Ok(None);
        }

        let body = NewChannel { name, creator: vec![self.session.user_id().to_string()] };
        match self.api.create_channel(&body).await {
            Ok(channel) => {
                info!("Created channel {} ({})", channel.name, channel.id);
                self.state.push_notice(Notice::info("Channel created."));
                self.state.channel_name_input.clear();
                self.refresh_channels().await;
                self.enter(&channel.id).await;
                Ok(Some(channel))
            }
            Err(e) => {
                error!("Creating channel failed: {e}");
                self.state.push_notice(Notice::error("Failed to create channel."));
                Err(e)
            }
        }
    }

    /// Adds the selected users one at a time, stopping at the first failure.
    /// Adds that already went through are not rolled back.
    pub async fn add_members(&mut self) -> Result<AddMembersReport, ClientError> {
        let channel_id = self.state.active_channel().map(str::to_string).ok_or(ClientError::NoActiveChannel)?;
        // Members may have changed since the pick; only addable users are sent.
        let (selected, stale): (Vec<String>, Vec<String>) = std::mem::take(&mut self.state.selected_members)
            .into_iter()
            .partition(|id| self.state.is_addable(id));
        if !stale.is_empty() {
            debug!("Dropping users that can no longer be added: {}", stale.join(", "));
        }
        self.state.selected_members = selected.clone();
        let mut report = AddMembersReport::default();
        if selected.is_empty() {
            return Ok(report);
        }

        let mut pending = selected.into_iter();
        for user_id in pending.by_ref() {
            let body = MembershipChange { channel_id: channel_id.clone(), user_id: user_id.clone() };
            match self.api.add_member(&body).await {
                Ok(()) => report.added.push(user_id),
                Err(e) => {
                    error!("Adding {user_id} to {channel_id} failed: {e}");
                    report.failed = Some((user_id, e.to_string()));
                    break;
                }
            }
        }
        report.skipped = pending.collect();

        self.state.selected_members.retain(|id| !report.added.contains(id));

        if report.is_complete() {
            self.state.push_notice(Notice::info("Members added."));
        } else {
            let failed = report.failed.as_ref().map(|(id, _)| id.as_str()).unwrap_or_default();
            let mut text = format!("Could not add member {failed}.");
            if !report.added.is_empty() {
                text.push_str(&format!(" Added: {}.", report.added.join(", ")));
            }
            if !report.skipped.is_empty() {
                text.push_str(&format!(" Not attempted: {}.", report.skipped.join(", ")));
            }
            self.state.push_notice(Notice::error(text));
        }

        if !report.added.is_empty() {
            self.refresh_members().await;
        }
        Ok(report)
    }

    /// Removes the local user from the open channel and returns home.
    pub async fn leave_channel(&mut self) -> Result<(), ClientError> {
        let channel_id = self.state.active_channel().map(str::to_string).ok_or(ClientError::NoActiveChannel)?;
        let body = MembershipChange { channel_id: channel_id.clone(), user_id: self.session.user_id().to_string() };

        match self.api.leave_channel(&body).await {
            Ok(()) => {
                info!("Left channel {channel_id}");
                self.state.push_notice(Notice::info("You left the channel."));
                self.refresh_channels().await;
                self.back().await;
                Ok(())
            }
            Err(e) => {
                error!("Leaving channel {channel_id} failed: {e}");
                self.state.push_notice(Notice::error("Could not leave the channel."));
                Err(e)
            }
        }
    }
}

async fn read_upload(path: &Path, channel_id: String, sender_id: &str) -> Result<FileUpload, ClientError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ClientError::Upload { path: path.to_path_buf(), source: e })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(FileUpload { channel_id, sender_id: sender_id.to_string(), file_name, bytes })
}
