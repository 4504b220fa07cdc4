//! Minimal STOMP 1.2 client framing.
//!
//! Only what a publish/subscribe chat client needs: CONNECT, SUBSCRIBE,
//! SEND and DISCONNECT outbound; CONNECTED, MESSAGE, RECEIPT and ERROR
//! inbound. One WebSocket text message may carry several frames and
//! heart-beat EOLs between them.

use crate::error::StompError;

pub const SUBSCRIPTION_ID: &str = "sub-0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Connected,
    Send,
    Subscribe,
    Disconnect,
    Message,
    Receipt,
    Error,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Connected => "CONNECTED",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Disconnect => "DISCONNECT",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONNECT" | "STOMP" => Some(Command::Connect),
            "CONNECTED" => Some(Command::Connected),
            "SEND" => Some(Command::Send),
            "SUBSCRIBE" => Some(Command::Subscribe),
            "DISCONNECT" => Some(Command::Disconnect),
            "MESSAGE" => Some(Command::Message),
            "RECEIPT" => Some(Command::Receipt),
            "ERROR" => Some(Command::Error),
            _ => None,
        }
    }

    // CONNECT and CONNECTED headers are sent verbatim
    fn escapes_headers(&self) -> bool {
        !matches!(self, Command::Connect | Command::Connected)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = body;
        self
    }

    /// First occurrence wins when a header repeats
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(self.body.len() + 64);
        out.push_str(self.command.as_str());
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Decode every frame in `data`, skipping heart-beat EOLs.
    pub fn decode_all(data: &str) -> Result<Vec<Frame>, StompError> {
        let mut frames = Vec::new();
        let mut rest = data;
        loop {
            rest = rest.trim_start_matches(['\n', '\r']);
            if rest.is_empty() {
                return Ok(frames);
            }
            let (frame, remaining) = decode_one(rest)?;
            frames.push(frame);
            rest = remaining;
        }
    }
}

fn decode_one(data: &str) -> Result<(Frame, &str), StompError> {
    let (command_line, mut rest) = split_line(data)
        .ok_or_else(|| StompError::Malformed("missing command line".to_string()))?;
    let command = Command::parse(command_line)
        .ok_or_else(|| StompError::Malformed(format!("unknown command '{}'", command_line)))?;

    let mut headers = Vec::new();
    loop {
        let (line, remaining) = split_line(rest)
            .ok_or_else(|| StompError::Malformed("unterminated headers".to_string()))?;
        rest = remaining;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| StompError::Malformed(format!("bad header line '{}'", line)))?;
        if command.escapes_headers() {
            headers.push((unescape_header(name)?, unescape_header(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .map(|(_, v)| {
            v.parse::<usize>()
                .map_err(|_| StompError::Malformed(format!("bad content-length '{}'", v)))
        })
        .transpose()?;

    let body_len = match content_length {
        Some(len) => {
            if rest.len() <= len || rest.as_bytes()[len] != 0 || !rest.is_char_boundary(len) {
                return Err(StompError::Malformed(
                    "body does not match content-length".to_string(),
                ));
            }
            len
        }
        None => rest
            .find('\0')
            .ok_or_else(|| StompError::Malformed("unterminated body".to_string()))?,
    };

    let frame = Frame {
        command,
        headers,
        body: rest[..body_len].to_string(),
    };
    Ok((frame, &rest[body_len + 1..]))
}

fn split_line(data: &str) -> Option<(&str, &str)> {
    let (line, rest) = data.split_once('\n')?;
    Some((line.strip_suffix('\r').unwrap_or(line), rest))
}

fn escape_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_header(value: &str) -> Result<String, StompError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(StompError::Malformed(format!(
                    "invalid header escape '\\{}'",
                    other.map(String::from).unwrap_or_default()
                )))
            }
        }
    }
    Ok(out)
}

/// Something the broker told us
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Connected { version: Option<String> },
    Message { destination: Option<String>, body: String },
    Receipt { id: String },
    BrokerError { message: String, body: String },
}

/// Client side of one STOMP session over an already-open socket
#[derive(Debug, Clone)]
pub struct StompSession {
    host: String,
    connected: bool,
}

impl StompSession {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn connect_frame(&self) -> Frame {
        Frame::new(Command::Connect)
            .header("accept-version", "1.2")
            .header("host", &self.host)
            .header("heart-beat", "0,0")
    }

    pub fn subscribe_frame(&self, topic: &str) -> Frame {
        Frame::new(Command::Subscribe)
            .header("id", SUBSCRIPTION_ID)
            .header("destination", topic)
    }

    pub fn send_frame(&self, destination: &str, body: String) -> Frame {
        Frame::new(Command::Send)
            .header("destination", destination)
            .header("content-type", "application/json")
            .header("content-length", &body.len().to_string())
            .with_body(body)
    }

    pub fn disconnect_frame(&self) -> Frame {
        Frame::new(Command::Disconnect)
    }

    /// Feed one socket text message through the session.
    pub fn receive(&mut self, text: &str) -> Result<Vec<SessionEvent>, StompError> {
        let mut events = Vec::new();
        for frame in Frame::decode_all(text)? {
            match frame.command {
                Command::Connected => {
                    self.connected = true;
                    events.push(SessionEvent::Connected {
                        version: frame.get_header("version").map(str::to_string),
                    });
                }
                Command::Message => {
                    if frame.get_header("subscription") != Some(SUBSCRIPTION_ID) {
                        log::debug!("Dropping MESSAGE for unknown subscription");
                        continue;
                    }
                    events.push(SessionEvent::Message {
                        destination: frame.get_header("destination").map(str::to_string),
                        body: frame.body,
                    });
                }
                Command::Receipt => {
                    events.push(SessionEvent::Receipt {
                        id: frame.get_header("receipt-id").unwrap_or_default().to_string(),
                    });
                }
                Command::Error => {
                    events.push(SessionEvent::BrokerError {
                        message: frame.get_header("message").unwrap_or_default().to_string(),
                        body: frame.body,
                    });
                }
                other => {
                    log::debug!("Ignoring client-only frame {} from broker", other.as_str());
                }
            }
        }
        Ok(events)
    }
}
