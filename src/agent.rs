use gloo::net::http::Request;
use std::rc::Rc;

use crate::config::WidgetConfig;
use crate::error::AgentError;
use crate::types::{AgentReply, AgentRequest, Author, ChatEntry, SessionId};

/// One request/response exchange with the agent backend
#[allow(async_fn_in_trait)]
pub trait AgentTransport {
    async fn chat(&self, request: &AgentRequest) -> Result<AgentReply, AgentError>;
}

/// Surface the controller draws on
pub trait AgentView {
    fn append_entry(&self, entry: ChatEntry);
    fn clear_input(&self);
    fn set_input_enabled(&self, enabled: bool);
    fn focus_input(&self);
}

/// JSON over `fetch`
pub struct HttpAgentTransport {
    endpoint: String,
}

impl HttpAgentTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl AgentTransport for HttpAgentTransport {
    async fn chat(&self, request: &AgentRequest) -> Result<AgentReply, AgentError> {
        let response = Request::post(&self.endpoint)
            .json(request)
            .map_err(|e| AgentError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| AgentError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(AgentError::Status(response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AgentError::Network(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Single-turn chat against the agent endpoint.
///
/// Every send renders the user's message immediately, keeps the input
/// disabled while the request is in flight and always re-enables and
/// refocuses it once the request settles, whatever the outcome.
pub struct AgentController<T, V> {
    session_id: SessionId,
    transport: T,
    view: V,
    config: Rc<WidgetConfig>,
}

impl<T: AgentTransport, V: AgentView> AgentController<T, V> {
    pub fn new(session_id: SessionId, transport: T, view: V, config: Rc<WidgetConfig>) -> Self {
        Self {
            session_id,
            transport,
            view,
            config,
        }
    }

    pub fn render_message(&self, content: &str, is_user: bool) {
        let author = if is_user { Author::User } else { Author::Agent };
        self.view.append_entry(ChatEntry::new(author, content));
    }

    /// Canned message shown when the panel is first mounted
    pub fn greet(&self) {
        self.render_message(&self.config.welcome_message, false);
    }

    /// Send the trimmed input. Returns false without touching the network
    /// when there is nothing to send.
    pub async fn send_message(&self, raw: &str) -> bool {
        let message = raw.trim();
        if message.is_empty() {
            return false;
        }

        self.render_message(message, true);
        self.view.clear_input();
        self.view.set_input_enabled(false);

        let request = AgentRequest {
            session_id: self.session_id.clone(),
            message: message.to_string(),
        };

        match self.transport.chat(&request).await {
            Ok(reply) => {
                if reply.is_error() {
                    log::warn!("Agent reported an error for session {}", self.session_id);
                }
                self.render_message(&reply.response, false);
            }
            Err(e) => {
                log::warn!("Agent round trip failed: {}", e);
                self.render_message(&self.config.fallback_message, false);
            }
        }

        self.view.set_input_enabled(true);
        self.view.focus_input();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum ViewEvent {
        Append(ChatEntry),
        Clear,
        Enabled(bool),
        Focus,
    }

    #[derive(Default, Clone)]
    struct RecordingView {
        events: Rc<RefCell<Vec<ViewEvent>>>,
    }

    impl RecordingView {
        fn entries(&self) -> Vec<ChatEntry> {
            self.events
                .borrow()
                .iter()
                .filter_map(|e| match e {
                    ViewEvent::Append(entry) => Some(entry.clone()),
                    _ => None,
                })
                .collect()
        }

        fn last_enabled(&self) -> Option<bool> {
            self.events.borrow().iter().rev().find_map(|e| match e {
                ViewEvent::Enabled(enabled) => Some(*enabled),
                _ => None,
            })
        }
    }

    impl AgentView for RecordingView {
        fn append_entry(&self, entry: ChatEntry) {
            self.events.borrow_mut().push(ViewEvent::Append(entry));
        }

        fn clear_input(&self) {
            self.events.borrow_mut().push(ViewEvent::Clear);
        }

        fn set_input_enabled(&self, enabled: bool) {
            self.events.borrow_mut().push(ViewEvent::Enabled(enabled));
        }

        fn focus_input(&self) {
            self.events.borrow_mut().push(ViewEvent::Focus);
        }
    }

    struct FakeTransport {
        outcome: fn() -> Result<AgentReply, AgentError>,
        requests: Rc<RefCell<Vec<AgentRequest>>>,
        view: RecordingView,
        disabled_during_call: RefCell<Option<bool>>,
    }

    impl AgentTransport for FakeTransport {
        async fn chat(&self, request: &AgentRequest) -> Result<AgentReply, AgentError> {
            self.requests.borrow_mut().push(request.clone());
            *self.disabled_during_call.borrow_mut() = self.view.last_enabled().map(|e| !e);
            (self.outcome)()
        }
    }

    fn reply_ok() -> Result<AgentReply, AgentError> {
        Ok(AgentReply {
            session_id: None,
            response: "Hi there".to_string(),
            status: Some("success".to_string()),
        })
    }

    fn reply_network_error() -> Result<AgentReply, AgentError> {
        Err(AgentError::Network("connection refused".to_string()))
    }

    fn reply_malformed() -> Result<AgentReply, AgentError> {
        serde_json::from_str::<AgentReply>("<html>").map_err(AgentError::from)
    }

    fn controller(
        outcome: fn() -> Result<AgentReply, AgentError>,
    ) -> (
        AgentController<FakeTransport, RecordingView>,
        RecordingView,
        Rc<RefCell<Vec<AgentRequest>>>,
    ) {
        let view = RecordingView::default();
        let requests = Rc::new(RefCell::new(Vec::new()));
        let transport = FakeTransport {
            outcome,
            requests: requests.clone(),
            view: view.clone(),
            disabled_during_call: RefCell::new(None),
        };
        let controller = AgentController::new(
            SessionId::new("session_1_abcdefghi".to_string()),
            transport,
            view.clone(),
            Rc::new(WidgetConfig::default()),
        );
        (controller, view, requests)
    }

    #[test]
    fn test_greet_renders_welcome() {
        let (controller, view, _) = controller(reply_ok);
        controller.greet();
        assert_eq!(
            view.entries(),
            vec![ChatEntry::agent(WidgetConfig::default().welcome_message)]
        );
    }

    #[test]
    fn test_empty_input_is_ignored() {
        let (controller, view, requests) = controller(reply_ok);
        assert!(!block_on(controller.send_message("")));
        assert!(!block_on(controller.send_message("   \t\n")));
        assert!(requests.borrow().is_empty());
        assert!(view.events.borrow().is_empty());
    }

    #[test]
    fn test_successful_round_trip() {
        let (controller, view, requests) = controller(reply_ok);
        assert!(block_on(controller.send_message("  hello  ")));

        assert_eq!(
            view.entries(),
            vec![ChatEntry::user("hello"), ChatEntry::agent("Hi there")]
        );
        let requests = requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "hello");
        assert_eq!(requests[0].session_id.as_str(), "session_1_abcdefghi");
        assert_eq!(view.last_enabled(), Some(true));
        assert_eq!(view.events.borrow().last(), Some(&ViewEvent::Focus));
    }

    #[test]
    fn test_input_disabled_while_in_flight() {
        let (controller, _view, _) = controller(reply_ok);
        block_on(controller.send_message("hello"));
        assert_eq!(*controller.transport.disabled_during_call.borrow(), Some(true));
    }

    #[test]
    fn test_network_failure_renders_fallback() {
        let (controller, view, _) = controller(reply_network_error);
        block_on(controller.send_message("hello"));

        assert_eq!(
            view.entries(),
            vec![
                ChatEntry::user("hello"),
                ChatEntry::agent(WidgetConfig::default().fallback_message),
            ]
        );
        assert_eq!(view.last_enabled(), Some(true));
        assert_eq!(view.events.borrow().last(), Some(&ViewEvent::Focus));
    }

    #[test]
    fn test_malformed_reply_renders_fallback() {
        let (controller, view, _) = controller(reply_malformed);
        block_on(controller.send_message("hello"));
        assert_eq!(
            view.entries()[1],
            ChatEntry::agent(WidgetConfig::default().fallback_message)
        );
        assert_eq!(view.last_enabled(), Some(true));
    }

    #[test]
    fn test_input_cleared_after_user_render() {
        let (controller, view, _) = controller(reply_ok);
        block_on(controller.send_message("hello"));
        let events = view.events.borrow();
        assert_eq!(events[0], ViewEvent::Append(ChatEntry::user("hello")));
        assert_eq!(events[1], ViewEvent::Clear);
        assert_eq!(events[2], ViewEvent::Enabled(false));
    }
}
