use std::io;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("bad magic cookie {0:#010x}")]
    BadCookie(u32),

    #[error("unexpected message type {0:#04x}")]
    WrongType(u8),

    #[error("unknown decision token")]
    UnknownDecision,

    #[error("result code {0} out of range")]
    BadResult(u8),

    #[error("card rank {0} out of range")]
    BadRank(u16),

    #[error("suit code {0} out of range")]
    BadSuit(u8),

    #[error("round count {0} outside 1..=255")]
    RoundCount(u32),

    #[error("name is not valid UTF-8")]
    BadName,
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// Peer closed the stream, a read timed out, or a write failed.
    #[error("connection lost: {0}")]
    ConnectionLost(#[source] io::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(#[source] FrameError),

    #[error("deck exhausted")]
    DeckExhausted,

    #[error("input closed: {0}")]
    Input(#[source] io::Error),
}

impl From<io::Error> for SessionError {
    fn from(e: io::Error) -> Self {
        SessionError::ConnectionLost(e)
    }
}
