//! REST route table. Every path is relative to the configured server URL.

pub const LOGIN: &str = "/api/auth/login";
pub const REGISTER: &str = "/api/auth/register";
pub const LOGOUT: &str = "/api/auth/logout";
pub const ALL_USERS: &str = "/api/auth/allusers";
pub const SET_AVATAR: &str = "/api/auth/setavatar";

// Direct messages between two users. The channel view does not call these.
pub const ADD_DIRECT_MESSAGE: &str = "/api/messages/addmsg";
pub const GET_DIRECT_MESSAGES: &str = "/api/messages/getmsg";

pub const CREATE_CHANNEL: &str = "/api/channels/create";
pub const USER_CHANNELS: &str = "/api/channels/user";
pub const CHANNEL_MESSAGES: &str = "/api/channels/messages";
pub const ADD_MEMBER: &str = "/api/channels/addmember";
pub const LEAVE_CHANNEL: &str = "/api/channels/leave";
pub const SEND_MESSAGE: &str = "/api/channels/message";
pub const UPLOAD_FILE: &str = "/api/channels/message/file";

/// Builds absolute endpoint URLs against one server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    host: String,
}

impl Endpoints {
    pub fn new(host: &str) -> Self {
        Self { host: host.trim_end_matches('/').to_string() }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.host)
    }

    pub fn login(&self) -> String {
        self.url(LOGIN)
    }

    pub fn register(&self) -> String {
        self.url(REGISTER)
    }

    pub fn logout(&self, user_id: &str) -> String {
        format!("{}/{user_id}", self.url(LOGOUT))
    }

    pub fn set_avatar(&self, user_id: &str) -> String {
        format!("{}/{user_id}", self.url(SET_AVATAR))
    }

    pub fn add_direct_message(&self) -> String {
        self.url(ADD_DIRECT_MESSAGE)
    }

    pub fn get_direct_messages(&self) -> String {
        self.url(GET_DIRECT_MESSAGES)
    }

    pub fn all_users(&self, user_id: &str) -> String {
        format!("{}/{user_id}", self.url(ALL_USERS))
    }

    pub fn channel_messages(&self, channel_id: &str) -> String {
        format!("{}/{channel_id}", self.url(CHANNEL_MESSAGES))
    }

    pub fn channel_members(&self, channel_id: &str) -> String {
        self.url(&format!("/api/channels/{channel_id}/members"))
    }

    pub fn user_channels(&self, user_id: &str) -> String {
        format!("{}/{user_id}", self.url(USER_CHANNELS))
    }

    pub fn create_channel(&self) -> String {
        self.url(CREATE_CHANNEL)
    }

    pub fn add_member(&self) -> String {
        self.url(ADD_MEMBER)
    }

    pub fn leave_channel(&self) -> String {
        self.url(LEAVE_CHANNEL)
    }

    pub fn send_message(&self) -> String {
        self.url(SEND_MESSAGE)
    }

    pub fn upload_file(&self) -> String {
        self.url(UPLOAD_FILE)
    }
}
