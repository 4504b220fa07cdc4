use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque per-browser identifier sent with every agent request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /api/agent/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub session_id: SessionId,
    pub message: String,
}

/// Reply from the agent endpoint. Only `response` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReply {
    #[serde(default)]
    pub session_id: Option<String>,
    pub response: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl AgentReply {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

/// Outbound live chat payload published to the broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveChatInput {
    pub user: String,
    pub message: String,
}

/// Broadcast payload received on the live chat topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveChatOutput {
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Agent,
}

impl Author {
    pub fn label(&self) -> &'static str {
        match self {
            Author::User => "You",
            Author::Agent => "Agent",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Author::User => "user-message",
            Author::Agent => "agent-message",
        }
    }
}

/// One rendered line in the agent conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub author: Author,
    pub content: String,
}

impl ChatEntry {
    pub fn new(author: Author, content: impl Into<String>) -> Self {
        Self {
            author,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Author::User, content)
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self::new(Author::Agent, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTab {
    Agent,
    LiveChat,
}
