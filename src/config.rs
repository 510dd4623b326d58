use std::time::Duration;

pub const DISCOVERY_PORT: u16 = 13122;
pub const DEFAULT_SERVER_NAME: &str = "DefinitelyNotRigged";
pub const DEFAULT_CLIENT_NAME: &str = "Just_One_More_Hit";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub name: String,
    // 0 lets the OS choose
    pub tcp_port: u16,
    pub broadcast_port: u16,
    pub broadcast_interval: Duration,
    pub request_timeout: Duration,
    pub decision_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            name: DEFAULT_SERVER_NAME.to_string(),
            tcp_port: 0,
            broadcast_port: DISCOVERY_PORT,
            broadcast_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(5),
            decision_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub name: String,
    pub broadcast_port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Fixed round count; asked interactively when unset.
    pub rounds: Option<u8>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            name: DEFAULT_CLIENT_NAME.to_string(),
            broadcast_port: DISCOVERY_PORT,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(12),
            rounds: None,
        }
    }
}
