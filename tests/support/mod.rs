//! Stub chat backend: the REST routes plus a `/ws` socket relay.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message as WsFrame, WebSocket, WebSocketUpgrade};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::broadcast;

use channel_chat::config::ClientConfig;
use channel_chat::models::{ChannelBroadcast, ClientEvent, ServerEvent};

#[derive(Clone)]
pub struct Stub {
    pub calls: Arc<Mutex<Vec<String>>>,
    relay: broadcast::Sender<(String, ServerEvent)>,
}

impl Stub {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn username(id: &str) -> &'static str {
    match id {
        "a" => "alice",
        "b" => "bob",
        "c" => "carol",
        _ => "someone",
    }
}

fn user(id: &str) -> Value {
    json!({ "_id": id, "username": username(id) })
}

async fn login(Json(body): Json<Value>) -> Json<Value> {
    if body["password"] == "secret" {
        Json(json!({ "status": true, "user": user("a") }))
    } else {
        Json(json!({ "status": false, "msg": "Incorrect Username or Password" }))
    }
}

async fn logout(State(stub): State<Stub>, Path(id): Path<String>) -> StatusCode {
    stub.record(format!("logout:{id}"));
    StatusCode::OK
}

async fn all_users(Path(id): Path<String>) -> Json<Value> {
    let users: Vec<Value> = ["a", "b", "c"].iter().filter(|u| **u != id).map(|u| user(u)).collect();
    Json(Value::Array(users))
}

async fn messages(Path(id): Path<String>) -> Json<Value> {
    if id == "empty" {
        return Json(json!({ "messages": [] }));
    }
    Json(json!({
        "messages": [{
            "_id": "m-0",
            "sender": user("b"),
            "message": "earlier",
            "channelId": id,
            "createdAt": "2024-05-01T09:00:00Z"
        }]
    }))
}

async fn members(Path(_id): Path<String>) -> Json<Value> {
    Json(json!({ "members": [user("a"), user("b")] }))
}

async fn user_channels(Path(_id): Path<String>) -> Json<Value> {
    Json(json!({ "channels": [{ "_id": "general", "name": "General" }] }))
}

async fn create(State(stub): State<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.record(format!("create:{}", body["name"].as_str().unwrap_or_default()));
    Json(json!({
        "status": true,
        "channel": { "_id": "ch-new", "name": body["name"], "creator": body["creator"], "members": body["creator"] }
    }))
}

async fn add_member(State(stub): State<Stub>, Json(body): Json<Value>) -> impl IntoResponse {
    let user_id = body["userId"].as_str().unwrap_or_default().to_string();
    stub.record(format!("addmember:{}:{user_id}", body["channelId"].as_str().unwrap_or_default()));
    if user_id == "bad" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "msg": "no such user" })));
    }
    (StatusCode::OK, Json(json!({ "status": true })))
}

/// Answers with a plain-text body, like an Express `res.sendStatus(200)`.
async fn leave(State(stub): State<Stub>, Json(body): Json<Value>) -> &'static str {
    stub.record(format!("leave:{}", body["userId"].as_str().unwrap_or_default()));
    "OK"
}

async fn send_message(State(stub): State<Stub>, Json(body): Json<Value>) -> impl IntoResponse {
    let text = body["message"].as_str().unwrap_or_default().to_string();
    stub.record(format!("message:{text}"));
    if text == "fail" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "msg": "db down" })));
    }
    let sender = body["senderId"].as_str().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "message": {
                "_id": "m-1",
                "sender": user(sender),
                "message": text,
                "channelId": body["channelId"],
                "createdAt": "2024-05-01T10:00:00Z"
            }
        })),
    )
}

async fn upload(State(stub): State<Stub>, mut multipart: Multipart) -> Json<Value> {
    let mut file_name = String::new();
    let mut size = 0;
    let mut sender = String::new();
    let mut channel = String::new();

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().unwrap_or_default().to_string();
                size = field.bytes().await.unwrap().len();
            }
            "channelId" => channel = field.text().await.unwrap(),
            "senderId" => sender = field.text().await.unwrap(),
            _ => {}
        }
    }

    stub.record(format!("upload:{channel}:{sender}:{file_name}:{size}"));
    Json(json!({
        "message": {
            "_id": "m-2",
            "sender": user(&sender),
            "fileUrl": format!("http://files.local/uploads/{file_name}"),
            "fileName": file_name,
            "channelId": channel
        }
    }))
}

async fn ws(ws: WebSocketUpgrade, State(stub): State<Stub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| relay_socket(socket, stub))
}

/// On join: sends two frames the client must skip, then a greeting from bob.
/// Every announcement is relayed to all sockets joined to the same channel.
async fn relay_socket(mut socket: WebSocket, stub: Stub) {
    let mut rx = stub.relay.subscribe();
    let mut joined: Option<String> = None;

    loop {
        tokio::select! {
            frame = socket.recv() => {
                let Some(Ok(frame)) = frame else { break };
                let text = match frame {
                    WsFrame::Text(t) => t.to_string(),
                    WsFrame::Close(_) => break,
                    _ => continue,
                };
                match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(ClientEvent::JoinChannel(channel_id)) => {
                        stub.record(format!("join:{channel_id}"));
                        joined = Some(channel_id);
                        let _ = socket.send(WsFrame::Text("not json".into())).await;
                        let _ = socket
                            .send(WsFrame::Text(r#"{"event":"typing","data":{"senderId":"b"}}"#.into()))
                            .await;
                        let greeting = ServerEvent::ChannelMessage(ChannelBroadcast {
                            sender_id: "b".into(),
                            message: "welcome".into(),
                        });
                        let json = serde_json::to_string(&greeting).unwrap();
                        let _ = socket.send(WsFrame::Text(json.into())).await;
                    }
                    Ok(ClientEvent::SendChannelMessage(m)) => {
                        stub.record(format!("announce:{}", m.message));
                        let event = ServerEvent::ChannelMessage(ChannelBroadcast {
                            sender_id: m.sender_id,
                            message: m.message,
                        });
                        let _ = stub.relay.send((m.channel_id, event));
                    }
                    Err(_) => {}
                }
            }
            Ok((channel_id, event)) = rx.recv() => {
                if joined.as_deref() == Some(channel_id.as_str()) {
                    let json = serde_json::to_string(&event).unwrap();
                    if socket.send(WsFrame::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

pub struct Backend {
    pub addr: SocketAddr,
    pub stub: Stub,
}

impl Backend {
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(format!("http://{}", self.addr));
        config.storage_dir = std::env::temp_dir().join(format!("channel_chat_it_{}", uuid::Uuid::new_v4()));
        config
    }
}

pub async fn spawn_backend() -> anyhow::Result<Backend> {
    let (relay, _) = broadcast::channel(64);
    let stub = Stub { calls: Arc::new(Mutex::new(Vec::new())), relay };

    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout/{id}", get(logout))
        .route("/api/auth/allusers/{id}", get(all_users))
        .route("/api/channels/messages/{id}", get(messages))
        .route("/api/channels/{id}/members", get(members))
        .route("/api/channels/user/{id}", get(user_channels))
        .route("/api/channels/create", post(create))
        .route("/api/channels/addmember", post(add_member))
        .route("/api/channels/leave", post(leave))
        .route("/api/channels/message", post(send_message))
        .route("/api/channels/message/file", post(upload))
        .route("/ws", get(ws))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok(Backend { addr, stub })
}
