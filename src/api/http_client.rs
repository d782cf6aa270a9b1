use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::endpoints::Endpoints;
use crate::api::ChatApi;
use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::models::{
    Channel, ChannelEnvelope, ChannelSummary, ChannelsEnvelope, Credentials, FileUpload, LoginResponse,
    MembersEnvelope, MembershipChange, Message, MessageEnvelope, MessagesEnvelope, NewChannel, NewMessage,
    User,
};

/// [`ChatApi`] over HTTP with `reqwest`.
#[derive(Clone)]
pub struct HttpChatApi {
    client: Client,
    endpoints: Endpoints,
}

impl HttpChatApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self { client, endpoints: Endpoints::new(&config.server_url) })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, ClientError> {
        debug!("GET {url}");
        execute(self.client.get(&url), &url).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, url: String, body: &B) -> Result<T, ClientError> {
        debug!("POST {url}");
        execute(self.client.post(&url).json(body), &url).await
    }

    /// POST whose response body carries nothing the client needs.
    async fn post_unit<B: Serialize>(&self, url: String, body: &B) -> Result<(), ClientError> {
        debug!("POST {url}");
        send(self.client.post(&url).json(body), &url).await.map(|_| ())
    }
}

/// Sends the request and returns the raw body, mapping non-2xx to [`ClientError::Server`].
async fn send(request: RequestBuilder, url: &str) -> Result<Vec<u8>, ClientError> {
    let resp = request.send().await?;

    let status = resp.status();
    debug!("{status} from {url}");
    let bytes = resp.bytes().await?.to_vec();
    if !status.is_success() {
        let body = String::from_utf8_lossy(&bytes).into_owned();
        return Err(ClientError::Server { status: status.as_u16(), body });
    }
    Ok(bytes)
}

async fn execute<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> Result<T, ClientError> {
    let bytes = send(request, url).await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        debug!("Unexpected response body from {url}: {e}");
        ClientError::Decode(e)
    })
}

impl ChatApi for HttpChatApi {
    async fn login(&self, credentials: &Credentials) -> Result<User, ClientError> {
        let resp: LoginResponse = self.post(self.endpoints.login(), credentials).await?;
        match (resp.status, resp.user) {
            (true, Some(user)) => Ok(user),
            _ => Err(ClientError::Rejected {
                message: resp.msg.unwrap_or_else(|| "login failed".to_string()),
            }),
        }
    }

    async fn logout(&self, user_id: &str) -> Result<(), ClientError> {
        let url = self.endpoints.logout(user_id);
        debug!("GET {url}");
        send(self.client.get(&url), &url).await.map(|_| ())
    }

    async fn list_users_except(&self, user_id: &str) -> Result<Vec<User>, ClientError> {
        self.get(self.endpoints.all_users(user_id)).await
    }

    async fn channel_messages(&self, channel_id: &str) -> Result<Vec<Message>, ClientError> {
        let env: MessagesEnvelope = self.get(self.endpoints.channel_messages(channel_id)).await?;
        Ok(env.messages)
    }

    async fn channel_members(&self, channel_id: &str) -> Result<Vec<User>, ClientError> {
        let env: MembersEnvelope = self.get(self.endpoints.channel_members(channel_id)).await?;
        Ok(env.members)
    }

    async fn user_channels(&self, user_id: &str) -> Result<Vec<ChannelSummary>, ClientError> {
        let env: ChannelsEnvelope = self.get(self.endpoints.user_channels(user_id)).await?;
        Ok(env.channels)
    }

    async fn create_channel(&self, body: &NewChannel) -> Result<Channel, ClientError> {
        let env: ChannelEnvelope = self.post(self.endpoints.create_channel(), body).await?;
        Ok(env.channel)
    }

    async fn add_member(&self, body: &MembershipChange) -> Result<(), ClientError> {
        self.post_unit(self.endpoints.add_member(), body).await
    }

    async fn leave_channel(&self, body: &MembershipChange) -> Result<(), ClientError> {
        self.post_unit(self.endpoints.leave_channel(), body).await
    }

    async fn send_message(&self, body: &NewMessage) -> Result<Message, ClientError> {
        let env: MessageEnvelope = self.post(self.endpoints.send_message(), body).await?;
        Ok(env.message)
    }

    async fn upload_file(&self, upload: FileUpload) -> Result<Message, ClientError> {
        let url = self.endpoints.upload_file();
        debug!("POST {url} (multipart, {} bytes)", upload.bytes.len());
        let form = Form::new()
            .part("file", Part::bytes(upload.bytes).file_name(upload.file_name))
            .text("channelId", upload.channel_id)
            .text("senderId", upload.sender_id);

        let env: MessageEnvelope = execute(self.client.post(&url).multipart(form), &url).await?;
        Ok(env.message)
    }
}
