pub mod endpoints;
pub mod http_client;

use std::future::Future;

use crate::errors::ClientError;
use crate::models::{
    Channel, ChannelSummary, Credentials, FileUpload, MembershipChange, Message, NewChannel, NewMessage,
    User,
};

pub use http_client::HttpChatApi;

/// The remote chat REST API as the client consumes it.
pub trait ChatApi {
    fn login(&self, credentials: &Credentials) -> impl Future<Output = Result<User, ClientError>> + Send;

    fn logout(&self, user_id: &str) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Every registered user except `user_id`.
    fn list_users_except(&self, user_id: &str) -> impl Future<Output = Result<Vec<User>, ClientError>> + Send;

    fn channel_messages(&self, channel_id: &str)
        -> impl Future<Output = Result<Vec<Message>, ClientError>> + Send;

    fn channel_members(&self, channel_id: &str) -> impl Future<Output = Result<Vec<User>, ClientError>> + Send;

    fn user_channels(&self, user_id: &str)
        -> impl Future<Output = Result<Vec<ChannelSummary>, ClientError>> + Send;

    fn create_channel(&self, body: &NewChannel) -> impl Future<Output = Result<Channel, ClientError>> + Send;

    fn add_member(&self, body: &MembershipChange) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn leave_channel(&self, body: &MembershipChange) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn send_message(&self, body: &NewMessage) -> impl Future<Output = Result<Message, ClientError>> + Send;

    fn upload_file(&self, upload: FileUpload) -> impl Future<Output = Result<Message, ClientError>> + Send;
}
