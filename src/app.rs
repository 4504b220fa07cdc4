use std::rc::Rc;
use yew::prelude::*;
use gloo::events::EventListener;
use wasm_bindgen::JsCast;

use crate::agent_panel::AgentPanel;
use crate::config::WidgetConfig;
use crate::livechat_panel::LiveChatPanel;
use crate::types::ActiveTab;

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: Rc<WidgetConfig>,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let active_tab = use_state(|| ActiveTab::Agent);

    // Keyboard shortcut for Cmd/Ctrl+K
    {
        let active_tab = active_tab.clone();
        use_effect_with((), move |_| {
            let document = gloo_utils::document();

            let listener = EventListener::new(&document, "keydown", move |event| {
                if let Some(keyboard_event) = event.dyn_ref::<web_sys::KeyboardEvent>() {
                    if (keyboard_event.meta_key() || keyboard_event.ctrl_key())
                        && keyboard_event.key() == "k"
                    {
                        keyboard_event.prevent_default();
                        active_tab.set(match *active_tab {
                            ActiveTab::Agent => ActiveTab::LiveChat,
                            ActiveTab::LiveChat => ActiveTab::Agent,
                        });
                    }
                }
            });

            move || drop(listener)
        });
    }

    let tab_button = |tab: ActiveTab, label: &'static str| {
        let active_tab = active_tab.clone();
        let is_active = *active_tab == tab;
        let onclick = Callback::from(move |_: MouseEvent| active_tab.set(tab));
        html! {
            <button
                {onclick}
                class={classes!(
                    "flex-1",
                    "px-4",
                    "py-2",
                    "text-sm",
                    "font-medium",
                    if is_active { "border-b-2 border-blue-500 text-blue-600" } else { "text-gray-500 hover:text-gray-700" }
                )}
            >
                {label}
            </button>
        }
    };

    html! {
        <div class="flex flex-col h-screen bg-white">
            <div class="flex border-b border-gray-300">
                {tab_button(ActiveTab::Agent, "Agent")}
                {tab_button(ActiveTab::LiveChat, "Live chat")}
            </div>
            <AgentPanel config={props.config.clone()} visible={*active_tab == ActiveTab::Agent} />
            <LiveChatPanel config={props.config.clone()} visible={*active_tab == ActiveTab::LiveChat} />
        </div>
    }
}
