use blackjack::config::{ServerConfig, DEFAULT_SERVER_NAME, DISCOVERY_PORT};
use blackjack::server;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct ServerArgs {
    #[arg(long, default_value_t = String::from(DEFAULT_SERVER_NAME))]
    name: String,
    /// Game port, 0 picks a free one
    #[arg(long, default_value_t = 0)]
    port: u16,
    #[arg(long, default_value_t = DISCOVERY_PORT)]
    broadcast_port: u16,
    /// Seconds between offers
    #[arg(long, default_value_t = 1)]
    broadcast_interval: u64,
    /// Seconds a player gets to decide before the game is dropped
    #[arg(long, default_value_t = 30)]
    decision_timeout: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "blackjack=info".into()))
        .init();

    let args = ServerArgs::parse();

    let config = ServerConfig {
        name: args.name,
        tcp_port: args.port,
        broadcast_port: args.broadcast_port,
        broadcast_interval: Duration::from_secs(args.broadcast_interval),
        decision_timeout: Duration::from_secs(args.decision_timeout),
        ..ServerConfig::default()
    };

    if let Err(e) = server::run(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
