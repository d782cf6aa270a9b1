use anyhow::{bail, Context};
use tracing::info;

use channel_chat::api::HttpChatApi;
use channel_chat::config::ClientConfig;
use channel_chat::console;
use channel_chat::errors::ClientError;
use channel_chat::realtime::WsConnector;
use channel_chat::service::ChatService;
use channel_chat::session::{self, SessionStore};

const USAGE: &str = "\
usage:
  channel-chat login <username> <password>
  channel-chat logout
  channel-chat [channel-id]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Logs go to stderr so they do not interleave with the chat view
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "channel_chat=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = ClientConfig::from_env().context("copy .env.example to .env or export CHAT_SERVER_URL")?;
    let api = HttpChatApi::new(&config)?;
    let store = SessionStore::from_config(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("-h" | "--help") => println!("{USAGE}"),
        Some("login") => {
            let (Some(username), Some(password)) = (args.get(1), args.get(2)) else {
                bail!("{USAGE}");
            };
            let session = session::login(&api, &store, username, password).await?;
            println!("Logged in as {}", session.username());
        }
        Some("logout") => match store.load().await? {
            Some(session) => {
                session::logout(&api, &store, session).await?;
                println!("Logged out");
            }
            None => println!("Not logged in"),
        },
        channel_id => {
            let session = store.load().await?.ok_or(ClientError::NoSession)?;
            info!("Session for {} loaded from {}", session.username(), store.path().display());

            // ── Chat view ─────────────────────────────────────────────────────
            let connector = WsConnector::new(config.socket_url.clone());
            let mut chat = ChatService::new(api, connector, session);
            chat.mount(channel_id).await;
            let result = console::run(&mut chat).await;
            chat.close().await;
            result?;
        }
    }

    Ok(())
}
