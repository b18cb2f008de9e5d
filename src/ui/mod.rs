/// UI module exports

pub mod components;
pub mod form_modal;
pub mod popup;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Resolve after `ms` milliseconds, or immediately outside a window context.
pub async fn sleep_ms(ms: u32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().map(|window| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32)
        });
        if !matches!(scheduled, Some(Ok(_))) {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}
