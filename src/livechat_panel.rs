use std::rc::Rc;
use web_sys::{HtmlElement, HtmlInputElement};
use yew::prelude::*;

use crate::config::WidgetConfig;
use crate::livechat::{LiveChatController, LiveChatView};
use crate::socket::BrowserConnector;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveChatState {
    pub connected: bool,
    pub lines: Vec<AttrValue>,
}

pub enum LiveChatAction {
    SetConnected(bool),
    Append(String),
}

impl Reducible for LiveChatState {
    type Action = LiveChatAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            LiveChatAction::SetConnected(connected) => next.connected = connected,
            LiveChatAction::Append(markup) => next.lines.push(AttrValue::from(markup)),
        }
        Rc::new(next)
    }
}

pub struct PanelView {
    dispatch: UseReducerDispatcher<LiveChatState>,
    message_ref: NodeRef,
}

impl LiveChatView for PanelView {
    fn set_connected(&self, connected: bool) {
        self.dispatch.dispatch(LiveChatAction::SetConnected(connected));
    }

    fn append_markup(&self, markup: String) {
        self.dispatch.dispatch(LiveChatAction::Append(markup));
    }

    fn clear_message_input(&self) {
        if let Some(input) = self.message_ref.cast::<HtmlInputElement>() {
            input.set_value("");
        }
    }
}

fn page_origin() -> (String, String) {
    let location = gloo_utils::window().location();
    let host = location.host().unwrap_or_else(|e| {
        log::warn!("Could not read page host: {:?}", e);
        "localhost".to_string()
    });
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    (host, protocol)
}

fn input_value(node: &NodeRef) -> String {
    node.cast::<HtmlInputElement>()
        .map(|input| input.value())
        .unwrap_or_default()
}

#[derive(Properties, PartialEq)]
pub struct LiveChatPanelProps {
    pub config: Rc<WidgetConfig>,
    #[prop_or(true)]
    pub visible: bool,
}

#[function_component(LiveChatPanel)]
pub fn live_chat_panel(props: &LiveChatPanelProps) -> Html {
    let state = use_reducer(LiveChatState::default);
    let user_ref = use_node_ref();
    let message_ref = use_node_ref();
    let log_ref = use_node_ref();

    let controller = {
        let config = props.config.clone();
        let view = PanelView {
            dispatch: state.dispatcher(),
            message_ref: message_ref.clone(),
        };
        use_memo((), move |_| {
            let (host, protocol) = page_origin();
            LiveChatController::new(config, &host, &protocol, BrowserConnector, view)
        })
    };

    // Drop the broker session when the panel goes away
    {
        let controller = controller.clone();
        use_effect_with((), move |_| move || controller.disconnect());
    }

    {
        let log_ref = log_ref.clone();
        use_effect_with(state.lines.len(), move |_| {
            if let Some(log) = log_ref.cast::<HtmlElement>() {
                log.set_scroll_top(log.scroll_height());
            }
            || ()
        });
    }

    let on_connect = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| controller.connect())
    };

    let on_disconnect = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| controller.disconnect())
    };

    let on_send = {
        let controller = controller.clone();
        let user_ref = user_ref.clone();
        let message_ref = message_ref.clone();
        Callback::from(move |_: MouseEvent| {
            let user = input_value(&user_ref);
            let message = input_value(&message_ref);
            if let Err(e) = controller.send_message(&user, &message) {
                log::error!("Could not publish message: {}", e);
            }
        })
    };

    let on_submit = Callback::from(|e: SubmitEvent| e.prevent_default());

    let connected = state.connected;

    html! {
        <div class={classes!("flex", "flex-col", "flex-1", (!props.visible).then_some("hidden"))}>
            <div class="p-4 border-b border-gray-300 flex items-center justify-between">
                <h2 class="text-lg font-semibold">{"Live chat"}</h2>
                <form class="flex gap-2" onsubmit={on_submit.clone()}>
                    <button
                        id="connect"
                        type="button"
                        disabled={connected}
                        onclick={on_connect}
                        class="px-3 py-1 bg-green-500 text-white rounded text-sm disabled:opacity-50"
                    >
                        { if connected { "Connected" } else { "Connect" } }
                    </button>
                    <button
                        id="disconnect"
                        type="button"
                        disabled={!connected}
                        onclick={on_disconnect}
                        class="px-3 py-1 bg-gray-500 text-white rounded text-sm disabled:opacity-50"
                    >
                        {"Disconnect"}
                    </button>
                </form>
            </div>

            <div ref={log_ref} class="chat-messages flex-1 overflow-y-auto p-4 space-y-2">
                <div id="livechat">
                    {
                        state.lines.iter().map(|markup| {
                            Html::from_html_unchecked(markup.clone())
                        }).collect::<Html>()
                    }
                </div>
            </div>

            <form class="p-4 border-t border-gray-300 flex gap-2" onsubmit={on_submit}>
                <input
                    ref={user_ref}
                    id="live-user"
                    type="text"
                    placeholder="Your name"
                    class="w-32 px-3 py-2 border border-gray-300 rounded-lg text-sm"
                />
                <input
                    ref={message_ref}
                    id="live-message"
                    type="text"
                    placeholder="Message"
                    class="flex-1 px-3 py-2 border border-gray-300 rounded-lg text-sm"
                />
                <button
                    id="live-send"
                    type="button"
                    onclick={on_send}
                    class="px-4 py-2 bg-blue-500 text-white rounded-lg text-sm font-medium hover:bg-blue-600 transition-colors"
                >
                    {"Send"}
                </button>
            </form>
        </div>
    }
}
