//! CLI for PullSub
//!
//! Subcommands:
//! - `server`: run the RPC server
//! - `client`: run a short scripted session against a server (smoke test)

use std::sync::Arc;

use clap::Parser;
use pullsub::Broker;
use pullsub::RemoteBroker;
use pullsub::config::load_config;
use pullsub::transport::start_websocket_server;
use pullsub::utils::logging;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pullsub")]
enum Command {
    /// Start the RPC server
    Server,
    /// Create a topic, subscribe, publish and read back through a server
    Client {
        /// WebSocket server URL to connect to
        #[arg(long, default_value = "ws://127.0.0.1:8000")]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    logging::init(&config.logging.level);

    match Command::parse() {
        Command::Server => {
            let addr = format!("{}:{}", config.server.host, config.server.port);
            let broker = Arc::new(Broker::with_settings(&config.broker));
            info!(policy = ?broker.subscribe_policy(), "broker ready");

            tokio::select! {
                res = start_websocket_server(addr, broker) => {
                    if let Err(e) = res {
                        error!("Server failed: {e}");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received. Exiting gracefully.");
                }
            }
        }
        Command::Client { url } => {
            if let Err(e) = run_client(&url).await {
                error!("Client failed: {e}");
            }
        }
    }
}

async fn run_client(url: &str) -> pullsub::Result<()> {
    let mut client = RemoteBroker::connect(url).await?;

    let subscriber = client.subscribe("chat", "http://127.0.0.1:9000/inbox").await?;
    println!("Subscribed: {subscriber:?}");

    let message = client.publish("chat", "Hello from the example client").await?;
    println!("Published: {message:?}");

    let pending = client.get_messages("chat", subscriber.id, true).await?;
    println!("Received {} message(s): {pending:?}", pending.len());

    println!("Topics: {:?}", client.get_topic_names().await?);

    client.unsubscribe("chat", subscriber.id).await?;
    client.close().await
}
