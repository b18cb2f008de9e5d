//! Bridge to the `chrome.*` extension APIs

use wasm_bindgen::prelude::*;

use crate::article::RawTab;
use crate::error::{StorageError, TabSourceError};
use crate::storage::{SESSION_STORAGE_KEY, SessionStore, StorageData};
use crate::tabs::{TabQuery, TabSource};

// Import JS bridge functions
#[wasm_bindgen(module = "/extension.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryTabs(filter: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn openTab(url: &str) -> Result<(), JsValue>;
}

/// `chrome.tabs.query`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeTabs;

impl TabSource for ChromeTabs {
    async fn query(&self, query: TabQuery) -> Result<Vec<RawTab>, TabSourceError> {
        let filter = serde_wasm_bindgen::to_value(&query)
            .map_err(|e| TabSourceError(format!("Failed to serialize: {:?}", e)))?;
        let tabs_js = queryTabs(filter)
            .await
            .map_err(|e| TabSourceError(format!("{:?}", e)))?;
        serde_wasm_bindgen::from_value(tabs_js)
            .map_err(|e| TabSourceError(format!("Failed to parse tabs: {:?}", e)))
    }
}

/// `chrome.storage.local`, one key for the auth session.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeSessionStore;

impl SessionStore for ChromeSessionStore {
    async fn load(&self) -> Result<StorageData, StorageError> {
        let storage_js = getStorage(SESSION_STORAGE_KEY)
            .await
            .map_err(|e| StorageError(format!("Failed to get storage: {:?}", e)))?;

        if storage_js.is_null() || storage_js.is_undefined() {
            return Ok(StorageData::default());
        }
        serde_wasm_bindgen::from_value(storage_js)
            .map_err(|e| StorageError(format!("Failed to parse storage: {:?}", e)))
    }

    async fn save(&self, data: &StorageData) -> Result<(), StorageError> {
        let storage_js = serde_wasm_bindgen::to_value(data)
            .map_err(|e| StorageError(format!("Failed to serialize storage: {:?}", e)))?;

        setStorage(SESSION_STORAGE_KEY, storage_js)
            .await
            .map_err(|e| StorageError(format!("Failed to save storage: {:?}", e)))
    }
}

/// Open `url` in a new browser tab.
pub async fn open_tab(url: &str) -> Result<(), String> {
    openTab(url)
        .await
        .map_err(|e| format!("Failed to open tab: {:?}", e))
}
