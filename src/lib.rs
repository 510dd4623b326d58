pub mod config;
pub use config::{ClientConfig, ServerConfig};

pub mod error;
pub use error::{FrameError, SessionError};

pub mod frame;
pub use frame::{Decision, Frame, Offer, Payload, Request, RoundResult};

pub mod handle;
pub use handle::Handle;

pub mod game;
pub use game::{Card, Deck, Hand, Suit};

pub mod stats;
pub use stats::SessionStats;

pub mod discovery;
pub mod prompt;

pub mod client;
pub mod server;
