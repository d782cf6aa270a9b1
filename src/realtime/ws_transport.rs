use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::errors::ClientError;
use crate::models::{ClientEvent, ServerEvent};
use crate::realtime::{RealtimeConnection, RealtimeConnector};

/// Connects to the socket server over a WebSocket.
///
/// Protocol: every frame is a JSON text message of the form
/// `{ "event": "<name>", "data": <payload> }`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl RealtimeConnector for WsConnector {
    type Connection = WsConnection;

    async fn connect(&self) -> Result<WsConnection, ClientError> {
        let (stream, _resp) = connect_async(self.url.as_str()).await?;
        info!("Socket connected to {}", self.url);
        Ok(WsConnection { stream })
    }
}

pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl RealtimeConnection for WsConnection {
    async fn emit(&mut self, event: &ClientEvent) -> Result<(), ClientError> {
        let json = serde_json::to_string(event)?;
        self.stream.send(WsMessage::Text(json.into())).await?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<Result<ServerEvent, ClientError>> {
        while let Some(msg) = self.stream.next().await {
            let msg = match msg {
                Ok(m) => m,
                Err(e) => return Some(Err(e.into())),
            };

            // Only text frames carry events
            let text = match msg {
                WsMessage::Text(t) => t,
                WsMessage::Close(_) => break,
                _ => continue,
            };

            return Some(serde_json::from_str::<ServerEvent>(&text).map_err(ClientError::Decode));
        }

        debug!("Socket stream ended");
        None
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.stream.close(None).await?;
        Ok(())
    }
}
