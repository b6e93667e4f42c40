//! In-memory session store

use super::validate_session_id;
use async_trait::async_trait;
use boardroom_application::{SessionStore, StoreError};
use boardroom_domain::SessionResult;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Keeps results for the lifetime of the process.
#[derive(Default)]
pub struct InMemorySessionStore {
    results: RwLock<BTreeMap<String, SessionResult>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, result: &SessionResult) -> Result<(), StoreError> {
        validate_session_id(&result.session_id)?;
        self.results
            .write()
            .await
            .insert(result.session_id.clone(), result.clone());
        Ok(())
    }

    async fn fetch(&self, session_id: &str) -> Result<Option<SessionResult>, StoreError> {
        Ok(self.results.read().await.get(session_id).cloned())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.results.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::sample_result;

    #[tokio::test]
    async fn test_save_replaces_earlier_record() {
        let store = InMemorySessionStore::new();
        let first = sample_result("judging");
        store.save(&first).await.unwrap();
        store.save(&first).await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["judging"]);
        assert_eq!(store.fetch("judging").await.unwrap(), Some(first));
        assert_eq!(store.fetch("other").await.unwrap(), None);
    }
}
