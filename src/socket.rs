use futures::channel::mpsc::{self, UnboundedSender};
use futures::{SinkExt, StreamExt};
use gloo::net::websocket::{futures::WebSocket, Message};
use wasm_bindgen_futures::spawn_local;

use crate::error::StompError;
use crate::livechat::{BrokerConnector, FrameSink, SocketEvent, SocketHandler};

/// Browser WebSocket, one reader task and one writer task per socket
pub struct BrowserConnector;

impl BrokerConnector for BrowserConnector {
    fn open(&self, url: &str, on_event: SocketHandler) -> Result<Box<dyn FrameSink>, StompError> {
        let socket = WebSocket::open(url).map_err(|e| StompError::Socket(e.to_string()))?;
        let (mut write, mut read) = socket.split();
        let (tx, mut rx) = mpsc::unbounded::<String>();

        // Writes queue until the socket is open; closing the channel closes the socket.
        spawn_local(async move {
            while let Some(text) = rx.next().await {
                if let Err(e) = write.send(Message::Text(text)).await {
                    log::error!("Error with websocket: {}", e);
                    break;
                }
            }
            if let Err(e) = write.close().await {
                log::debug!("Socket close: {}", e);
            }
        });

        spawn_local(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => on_event(SocketEvent::Text(text)),
                    Ok(Message::Bytes(bytes)) => match String::from_utf8(bytes) {
                        Ok(text) => on_event(SocketEvent::Text(text)),
                        Err(e) => on_event(SocketEvent::Error(e.to_string())),
                    },
                    Err(e) => on_event(SocketEvent::Error(e.to_string())),
                }
            }
            on_event(SocketEvent::Closed);
        });

        Ok(Box::new(ChannelSink { tx }))
    }
}

struct ChannelSink {
    tx: UnboundedSender<String>,
}

impl FrameSink for ChannelSink {
    fn send_text(&self, text: String) -> Result<(), StompError> {
        self.tx
            .unbounded_send(text)
            .map_err(|e| StompError::Socket(e.to_string()))
    }

    fn close(&self) {
        self.tx.close_channel();
    }
}
