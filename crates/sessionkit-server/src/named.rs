//! A [`Sessions`] view bound to one session name.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sessionkit_store::{Options, Session};

use crate::adapter::Sessions;
use crate::error::Result;

/// Same verbs as [`Sessions`], without repeating the session name.
///
/// ```ignore
/// let cart = sessions.named("cart");
/// cart.set("items", 3).await;
/// ```
#[derive(Clone)]
pub struct NamedSession {
    sessions: Sessions,
    name: String,
}

impl NamedSession {
    pub(crate) fn new(sessions: Sessions, name: String) -> Self {
        Self { sessions, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.sessions.get(&self.name, key).await
    }

    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.sessions.get_as(&self.name, key).await
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.sessions.set(&self.name, key, value).await
    }

    pub async fn insert<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> Result<()> {
        self.sessions.insert(&self.name, key, value).await
    }

    pub async fn delete(&self, key: &str) {
        self.sessions.delete(&self.name, key).await
    }

    pub async fn clear(&self) {
        self.sessions.clear(&self.name).await
    }

    pub async fn add_flash(&self, value: impl Into<Value>, key: Option<&str>) {
        self.sessions.add_flash(&self.name, value, key).await
    }

    pub async fn flashes(&self, key: Option<&str>) -> Vec<Value> {
        self.sessions.flashes(&self.name, key).await
    }

    pub async fn set_options(&self, options: Options) {
        self.sessions.set_options(&self.name, options).await
    }

    pub async fn session(&self) -> Session {
        self.sessions.session(&self.name).await
    }

    pub async fn written(&self) -> bool {
        self.sessions.written(&self.name).await
    }
}
