use std::rc::Rc;
use web_sys::{HtmlButtonElement, HtmlElement, HtmlInputElement, KeyboardEvent};
use yew::prelude::*;

use crate::agent::{AgentController, AgentView, HttpAgentTransport};
use crate::config::WidgetConfig;
use crate::markup::agent_entry_markup;
use crate::session::{ensure_session_id, LocalSessionStore};
use crate::types::ChatEntry;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentChatState {
    pub entries: Vec<ChatEntry>,
    pub busy: bool,
}

pub enum AgentAction {
    Append(ChatEntry),
    SetBusy(bool),
}

impl Reducible for AgentChatState {
    type Action = AgentAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            AgentAction::Append(entry) => next.entries.push(entry),
            AgentAction::SetBusy(busy) => next.busy = busy,
        }
        Rc::new(next)
    }
}

/// `AgentView` backed by the panel's reducer and input elements
pub struct PanelView {
    dispatch: UseReducerDispatcher<AgentChatState>,
    input_ref: NodeRef,
    send_ref: NodeRef,
}

impl AgentView for PanelView {
    fn append_entry(&self, entry: ChatEntry) {
        self.dispatch.dispatch(AgentAction::Append(entry));
    }

    fn clear_input(&self) {
        if let Some(input) = self.input_ref.cast::<HtmlInputElement>() {
            input.set_value("");
        }
    }

    fn set_input_enabled(&self, enabled: bool) {
        // Touch the elements directly so focus works before the next render
        if let Some(input) = self.input_ref.cast::<HtmlInputElement>() {
            input.set_disabled(!enabled);
        }
        if let Some(button) = self.send_ref.cast::<HtmlButtonElement>() {
            button.set_disabled(!enabled);
        }
        self.dispatch.dispatch(AgentAction::SetBusy(!enabled));
    }

    fn focus_input(&self) {
        if let Some(input) = self.input_ref.cast::<HtmlInputElement>() {
            if let Err(e) = input.focus() {
                log::debug!("Could not focus input: {:?}", e);
            }
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct AgentPanelProps {
    pub config: Rc<WidgetConfig>,
    #[prop_or(true)]
    pub visible: bool,
}

#[function_component(AgentPanel)]
pub fn agent_panel(props: &AgentPanelProps) -> Html {
    let state = use_reducer(AgentChatState::default);
    let input_ref = use_node_ref();
    let send_ref = use_node_ref();
    let list_ref = use_node_ref();

    let controller = {
        let config = props.config.clone();
        let view = PanelView {
            dispatch: state.dispatcher(),
            input_ref: input_ref.clone(),
            send_ref: send_ref.clone(),
        };
        use_memo((), move |_| {
            let session_id = ensure_session_id(
                &LocalSessionStore,
                &config.session_storage_key,
                js_sys::Date::now() as u64,
            );
            log::debug!("Agent session {}", session_id);
            let transport = HttpAgentTransport::new(config.agent_endpoint.clone());
            AgentController::new(session_id, transport, view, config)
        })
    };

    {
        let controller = controller.clone();
        use_effect_with((), move |_| {
            controller.greet();
            || ()
        });
    }

    // Keep the newest entry in view
    {
        let list_ref = list_ref.clone();
        use_effect_with(state.entries.len(), move |_| {
            if let Some(list) = list_ref.cast::<HtmlElement>() {
                list.set_scroll_top(list.scroll_height());
            }
            || ()
        });
    }

    let send = {
        let controller = controller.clone();
        let input_ref = input_ref.clone();
        Callback::from(move |_: ()| {
            let Some(input) = input_ref.cast::<HtmlInputElement>() else {
                return;
            };
            let value = input.value();
            let controller = controller.clone();
            wasm_bindgen_futures::spawn_local(async move {
                controller.send_message(&value).await;
            });
        })
    };

    let on_click = {
        let send = send.clone();
        Callback::from(move |_: MouseEvent| send.emit(()))
    };

    let on_keypress = {
        let send = send.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                e.prevent_default();
                send.emit(());
            }
        })
    };

    html! {
        <div class={classes!("flex", "flex-col", "flex-1", (!props.visible).then_some("hidden"))}>
            <div class="p-4 border-b border-gray-300">
                <h2 class="text-lg font-semibold">{"Agent"}</h2>
            </div>

            <div ref={list_ref} class="chat-messages flex-1 overflow-y-auto p-4 space-y-3">
                <div id="messages">
                    {
                        state.entries.iter().map(|entry| {
                            Html::from_html_unchecked(AttrValue::from(agent_entry_markup(entry)))
                        }).collect::<Html>()
                    }
                </div>
            </div>

            <div class="p-4 border-t border-gray-300 flex gap-2">
                <input
                    ref={input_ref}
                    id="message"
                    type="text"
                    placeholder="Type a message..."
                    disabled={state.busy}
                    onkeypress={on_keypress}
                    class="flex-1 px-3 py-2 border border-gray-300 rounded-lg text-sm focus:outline-none focus:ring-2 focus:ring-blue-500"
                />
                <button
                    ref={send_ref}
                    id="send"
                    disabled={state.busy}
                    onclick={on_click}
                    class="px-4 py-2 bg-blue-500 text-white rounded-lg text-sm font-medium hover:bg-blue-600 transition-colors"
                >
                    {"Send"}
                </button>
            </div>
        </div>
    }
}
