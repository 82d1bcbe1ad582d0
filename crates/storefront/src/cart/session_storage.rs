//! Visitor session as cart storage.

use tower_sessions::Session;

use super::store::{KeyValueStore, StoreError};

/// [`KeyValueStore`] over the visitor's tower-sessions session.
///
/// The session cookie plays the part of browser local storage: every visitor
/// gets their own namespace and it survives across page loads.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    session: Session,
}

impl SessionStorage {
    /// Wrap a session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl KeyValueStore for SessionStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.session.get::<String>(key).await?)
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.session.insert(key, value).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.session.remove::<serde_json::Value>(key).await?;
        Ok(())
    }
}
