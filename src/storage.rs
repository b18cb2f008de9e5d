//! Session persistence in extension local storage

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::session::Session;

pub const SESSION_STORAGE_KEY: &str = "dashstash_session";

/// Root storage structure under [`SESSION_STORAGE_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageData {
    #[serde(default)]
    pub session: Option<Session>,
}

impl StorageData {
    pub fn new(session: Option<Session>) -> Self {
        StorageData { session }
    }

    /// The stored session unless it expired before `now_secs`.
    pub fn live_session(self, now_secs: i64) -> Option<Session> {
        self.session
            .filter(|s| s.expires_at.is_none_or(|exp| exp > now_secs))
    }
}

/// Where the auth client mirrors its current session.
#[allow(async_fn_in_trait)]
pub trait SessionStore {
    async fn load(&self) -> Result<StorageData, StorageError>;
    async fn save(&self, data: &StorageData) -> Result<(), StorageError>;
}

/// Keeps the session only for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    data: RefCell<StorageData>,
}

impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<StorageData, StorageError> {
        Ok(self.data.borrow().clone())
    }

    async fn save(&self, data: &StorageData) -> Result<(), StorageError> {
        *self.data.borrow_mut() = data.clone();
        Ok(())
    }
}
