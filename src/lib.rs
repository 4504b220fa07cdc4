mod app;
mod agent_panel;
mod livechat_panel;
mod socket;

pub mod agent;
pub mod config;
pub mod error;
pub mod livechat;
pub mod markup;
pub mod session;
pub mod stomp;
pub mod types;

use std::rc::Rc;

use app::{App, AppProps};
use config::WidgetConfig;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn run_app() {
    let (config, config_warning) = WidgetConfig::from_document();
    let (level, level_warning) = match config.log_level() {
        Ok(level) => (level, None),
        Err(warning) => (log::Level::Info, Some(warning)),
    };
    wasm_logger::init(wasm_logger::Config::new(level));
    for warning in config_warning.into_iter().chain(level_warning) {
        log::warn!("{}", warning);
    }

    yew::Renderer::<App>::with_props(AppProps {
        config: Rc::new(config),
    })
    .render();
}
