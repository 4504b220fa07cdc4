use thiserror::Error;

/// Failure of a single agent round trip
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent request failed: {0}")]
    Network(String),

    #[error("agent endpoint returned status {0}")]
    Status(u16),

    #[error("malformed agent reply: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StompError {
    #[error("malformed STOMP frame: {0}")]
    Malformed(String),

    #[error("there is no established STOMP connection")]
    NotConnected,

    #[error("websocket failure: {0}")]
    Socket(String),

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}
