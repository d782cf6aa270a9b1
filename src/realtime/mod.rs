pub mod ws_transport;

use std::future::Future;

use tracing::{debug, info, warn};

use crate::errors::ClientError;
use crate::models::{ClientEvent, NewMessage, ServerEvent};

pub use ws_transport::{WsConnection, WsConnector};

/// Opens connections to the real-time channel server.
pub trait RealtimeConnector {
    type Connection: RealtimeConnection + Send;

    fn connect(&self) -> impl Future<Output = Result<Self::Connection, ClientError>> + Send;
}

/// One live socket connection.
pub trait RealtimeConnection {
    fn emit(&mut self, event: &ClientEvent) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Next event pushed by the server; `None` once the connection is closed.
    fn next_event(&mut self) -> impl Future<Output = Option<Result<ServerEvent, ClientError>>> + Send;

    fn close(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// A joined channel's event stream.
///
/// Acquired by [`ChannelSubscription::join`] and released with
/// [`ChannelSubscription::release`]. Dropping it drops the connection too, so a
/// subscription can never outlive the channel view that owns it.
pub struct ChannelSubscription<C: RealtimeConnection> {
    channel_id: String,
    conn: C,
}

impl<C: RealtimeConnection> ChannelSubscription<C> {
    pub async fn join<R>(connector: &R, channel_id: &str) -> Result<Self, ClientError>
    where
        R: RealtimeConnector<Connection = C>,
    {
        let mut conn = connector.connect().await?;
        conn.emit(&ClientEvent::JoinChannel(channel_id.to_string())).await?;
        info!("Joined real-time channel {channel_id}");
        Ok(Self { channel_id: channel_id.to_string(), conn })
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Announces an already persisted message to the other viewers.
    pub async fn announce(&mut self, message: &NewMessage) -> Result<(), ClientError> {
        if message.channel_id != self.channel_id {
            return Err(ClientError::NotSubscribed { channel_id: message.channel_id.clone() });
        }
        self.conn.emit(&ClientEvent::SendChannelMessage(message.clone())).await
    }

    /// Waits for the next well-formed event. Malformed frames are skipped.
    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        loop {
            match self.conn.next_event().await? {
                Ok(event) => return Some(event),
                Err(ClientError::Decode(e)) => debug!("Skipping unrecognised socket frame: {e}"),
                Err(e) => {
                    warn!("Real-time channel {} failed: {e}", self.channel_id);
                    return None;
                }
            }
        }
    }

    pub async fn release(mut self) {
        if let Err(e) = self.conn.close().await {
            debug!("Closing real-time channel {} failed: {e}", self.channel_id);
        }
        info!("Left real-time channel {}", self.channel_id);
    }
}
