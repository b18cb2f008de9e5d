/// DashStash - Chrome extension for saving articles to a reading list
/// Built with Rust + WASM + Yew

pub mod article;
pub mod background;
pub mod backend;
pub mod config;
pub mod error;
pub mod form;
pub mod gateway;
pub mod metadata;
pub mod notice;
pub mod observer;
pub mod session;
pub mod storage;
pub mod tabs;
pub mod tags;
pub mod ui;

use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::background::{BackgroundMessage, MessageResponse};
use crate::backend::{ChromeSessionStore, SupabaseClient};
use crate::config::Config;
use crate::error::AppError;
use crate::gateway::PersistenceGateway;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

/// Entry point for `chrome.runtime.onMessage` in the service worker.
#[wasm_bindgen]
pub async fn handle_background_message(message: JsValue) -> JsValue {
    let response = match serde_wasm_bindgen::from_value::<BackgroundMessage>(message) {
        Ok(message) => match Config::from_build_env() {
            Ok(config) => {
                let backend = Rc::new(SupabaseClient::new(&config, ChromeSessionStore));
                let gateway = PersistenceGateway::new(Rc::clone(&backend));
                background::handle_message(backend.as_ref(), &gateway, message).await
            }
            Err(e) => MessageResponse::failure(AppError::from(e).user_message()),
        },
        Err(e) => {
            log::debug!("Ignoring message: {}", e);
            MessageResponse::failure("Unknown action")
        }
    };

    serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::NULL)
}
