use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::WidgetConfig;
use crate::error::StompError;
use crate::markup::live_message_markup;
use crate::stomp::{Frame, SessionEvent, StompSession};
use crate::types::{ConnectionState, LiveChatInput, LiveChatOutput};

/// What the socket reports back to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Text(String),
    Error(String),
    Closed,
}

pub type SocketHandler = Rc<dyn Fn(SocketEvent)>;

/// Write half of an open socket
pub trait FrameSink {
    fn send_text(&self, text: String) -> Result<(), StompError>;
    fn close(&self);
}

/// Opens sockets to the broker
pub trait BrokerConnector {
    fn open(&self, url: &str, on_event: SocketHandler) -> Result<Box<dyn FrameSink>, StompError>;
}

pub trait LiveChatView {
    fn set_connected(&self, connected: bool);
    fn append_markup(&self, markup: String);
    fn clear_message_input(&self);
}

struct Link {
    epoch: u64,
    sink: Box<dyn FrameSink>,
    session: StompSession,
}

impl Link {
    fn send(&self, frame: Frame) -> Result<(), StompError> {
        self.sink.send_text(frame.encode())
    }
}

#[derive(Default)]
struct Inner {
    state: ConnectionState,
    epoch: u64,
    link: Option<Link>,
}

/// Broadcast chat over STOMP.
///
/// The controls only switch to connected once the broker answers with
/// CONNECTED. Errors are logged and never retried.
pub struct LiveChatController<C, V> {
    config: Rc<WidgetConfig>,
    host: String,
    broker_url: String,
    connector: C,
    view: V,
    inner: RefCell<Inner>,
}

impl<C, V> LiveChatController<C, V>
where
    C: BrokerConnector + 'static,
    V: LiveChatView + 'static,
{
    pub fn new(config: Rc<WidgetConfig>, host: &str, page_protocol: &str, connector: C, view: V) -> Self {
        let broker_url = config.broker_url(host, page_protocol);
        Self {
            config,
            host: host.to_string(),
            broker_url,
            connector,
            view,
            inner: RefCell::new(Inner::default()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.borrow().state
    }

    pub fn broker_url(&self) -> &str {
        &self.broker_url
    }

    pub fn connect(self: &Rc<Self>) {
        let epoch = {
            let mut inner = self.inner.borrow_mut();
            if inner.link.is_some() {
                log::debug!("Live chat client already active");
                return;
            }
            inner.epoch += 1;
            inner.epoch
        };

        let weak: Weak<Self> = Rc::downgrade(self);
        let on_event: SocketHandler = Rc::new(move |event| {
            if let Some(controller) = weak.upgrade() {
                controller.handle_socket_event(epoch, event);
            }
        });

        let sink = match self.connector.open(&self.broker_url, on_event) {
            Ok(sink) => sink,
            Err(e) => {
                log::error!("Error with websocket: {}", e);
                return;
            }
        };

        let link = Link {
            epoch,
            sink,
            session: StompSession::new(self.host.clone()),
        };
        if let Err(e) = link.send(link.session.connect_frame()) {
            log::error!("Error with websocket: {}", e);
            link.sink.close();
            return;
        }
        self.inner.borrow_mut().link = Some(link);
    }

    pub fn disconnect(&self) {
        let link = {
            let mut inner = self.inner.borrow_mut();
            inner.epoch += 1;
            inner.state = ConnectionState::Disconnected;
            inner.link.take()
        };
        if let Some(link) = link {
            if link.session.is_connected() {
                if let Err(e) = link.send(link.session.disconnect_frame()) {
                    log::debug!("DISCONNECT not delivered: {}", e);
                }
            }
            link.sink.close();
        }
        self.view.set_connected(false);
        log::info!("Disconnected");
    }

    /// Publish one message. Empty fields are sent as-is.
    pub fn send_message(&self, user: &str, message: &str) -> Result<(), StompError> {
        let payload = LiveChatInput {
            user: user.to_string(),
            message: message.to_string(),
        };
        {
            let inner = self.inner.borrow();
            let link = match inner.link.as_ref() {
                Some(link) if inner.state.is_connected() => link,
                _ => return Err(StompError::NotConnected),
            };
            log::debug!("Sending message: {:?}", payload);
            let body = serde_json::to_string(&payload)?;
            link.send(link.session.send_frame(&self.config.publish_destination, body))?;
        }
        self.view.clear_message_input();
        Ok(())
    }

    pub fn render_message(&self, content: &str) {
        self.view.append_markup(live_message_markup(content));
    }

    fn handle_socket_event(&self, epoch: u64, event: SocketEvent) {
        if self.inner.borrow().link.as_ref().map(|l| l.epoch) != Some(epoch) {
            return;
        }
        match event {
            SocketEvent::Text(text) => self.handle_text(&text),
            SocketEvent::Error(e) => log::error!("Error with websocket: {}", e),
            SocketEvent::Closed => {
                log::warn!("Live chat socket closed");
                {
                    let mut inner = self.inner.borrow_mut();
                    inner.link = None;
                    inner.state = ConnectionState::Disconnected;
                }
                self.view.set_connected(false);
            }
        }
    }

    fn handle_text(&self, text: &str) {
        let events = {
            let mut inner = self.inner.borrow_mut();
            let Some(link) = inner.link.as_mut() else {
                return;
            };
            match link.session.receive(text) {
                Ok(events) => events,
                Err(e) => {
                    log::error!("Broker sent an unreadable frame: {}", e);
                    return;
                }
            }
        };

        for event in events {
            match event {
                SessionEvent::Connected { version } => self.on_connected(version),
                SessionEvent::Message { destination, body } => {
                    log::debug!(
                        "Received message on {}: {}",
                        destination.as_deref().unwrap_or("?"),
                        body
                    );
                    match serde_json::from_str::<LiveChatOutput>(&body) {
                        Ok(output) => self.render_message(&output.content),
                        Err(e) => log::error!("Unreadable live chat payload: {}", e),
                    }
                }
                SessionEvent::Receipt { id } => log::debug!("Receipt {}", id),
                SessionEvent::BrokerError { message, body } => {
                    log::error!("Broker reported error: {}", message);
                    log::error!("Additional details: {}", body);
                }
            }
        }
    }

    fn on_connected(&self, version: Option<String>) {
        {
            let mut inner = self.inner.borrow_mut();
            let Some(link) = inner.link.as_ref() else {
                return;
            };
            if let Err(e) = link.send(link.session.subscribe_frame(&self.config.broadcast_topic)) {
                log::error!("Error with websocket: {}", e);
            }
            inner.state = ConnectionState::Connected;
        }
        log::info!("Connected: STOMP {}", version.as_deref().unwrap_or("unknown"));
        self.view.set_connected(true);
    }
}
