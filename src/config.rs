use serde::Deserialize;

/// Id of the optional JSON `<script>` element the host page can use to
/// override any of the defaults below.
pub const CONFIG_ELEMENT_ID: &str = "livechat-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    pub agent_endpoint: String,
    pub session_storage_key: String,
    pub welcome_message: String,
    pub fallback_message: String,
    pub broker_path: String,
    pub publish_destination: String,
    pub broadcast_topic: String,
    pub log_level: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            agent_endpoint: "/api/agent/chat".to_string(),
            session_storage_key: "agentSessionId".to_string(),
            welcome_message: "Hello! I'm your AI assistant. How can I help?".to_string(),
            fallback_message: "Could not reach the agent. Please check your connection."
                .to_string(),
            broker_path: "/hectoravlr-livechat-websocket".to_string(),
            publish_destination: "/livechatms/new-message".to_string(),
            broadcast_topic: "/topics/livechat".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl WidgetConfig {
    /// Parse an override document. Missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Read the config element from the current document. Falls back to
    /// defaults when it is absent or malformed; the second value says why.
    ///
    /// Runs before the logger is installed, so warnings are returned
    /// rather than logged.
    pub fn from_document() -> (Self, Option<String>) {
        let raw = gloo_utils::document()
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .map(|element| element.text_content().unwrap_or_default());
        Self::from_element_text(raw)
    }

    pub fn from_element_text(raw: Option<String>) -> (Self, Option<String>) {
        let Some(raw) = raw else {
            return (Self::default(), None);
        };
        match Self::from_json(&raw) {
            Ok(config) => (config, None),
            Err(e) => (
                Self::default(),
                Some(format!("Ignoring malformed #{}: {}", CONFIG_ELEMENT_ID, e)),
            ),
        }
    }

    pub fn log_level(&self) -> Result<log::Level, String> {
        self.log_level
            .parse()
            .map_err(|_| format!("Unknown log level '{}', using info", self.log_level))
    }

    /// Broker URL on the page's own host
    pub fn broker_url(&self, host: &str, page_protocol: &str) -> String {
        let scheme = if page_protocol == "https:" { "wss" } else { "ws" };
        format!("{}://{}{}", scheme, host, self.broker_path)
    }
}
