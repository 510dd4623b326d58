use blackjack::client;
use blackjack::config::{ClientConfig, DEFAULT_CLIENT_NAME, DISCOVERY_PORT};
use blackjack::prompt::Console;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct ClientArgs {
    #[arg(long, default_value_t = String::from(DEFAULT_CLIENT_NAME))]
    name: String,
    /// Rounds per game; asked for each game when left out
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..))]
    rounds: Option<u8>,
    #[arg(long, default_value_t = DISCOVERY_PORT)]
    broadcast_port: u16,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "blackjack=warn".into()))
        .init();

    let args = ClientArgs::parse();

    println!("Welcome {}", args.name);

    let config = ClientConfig {
        name: args.name,
        rounds: args.rounds,
        broadcast_port: args.broadcast_port,
        ..ClientConfig::default()
    };

    if let Err(e) = client::run(&config, &mut Console::stdio()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
