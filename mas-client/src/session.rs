use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::ClientError;

/// Client-local storage key holding the session id
pub const SESSION_STORAGE_KEY: &str = "sessionId";

/// Key/value storage that outlives a page load
pub trait SessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;
}

/// In-process storage, used natively and as the browser fallback.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stored session id, or a fresh UUID persisted for next time.
///
/// Storage failures never abort: the generated id is used for this page
/// lifetime and a warning is logged.
pub fn resolve_session_id(storage: &dyn SessionStorage) -> String {
    match storage.get(SESSION_STORAGE_KEY) {
        Ok(Some(existing)) if !existing.trim().is_empty() => return existing,
        Ok(_) => {}
        Err(e) => tracing::warn!("Session storage unreadable: {}", e),
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    if let Err(e) = storage.set(SESSION_STORAGE_KEY, &session_id) {
        tracing::warn!("Failed to persist session id: {}", e);
    }
    tracing::info!("Created session {}", session_id);
    session_id
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, ClientError> {
            Err(ClientError::Storage("quota".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), ClientError> {
            Err(ClientError::Storage("quota".to_string()))
        }
    }

    #[test]
    fn test_session_id_is_created_once_and_reused() {
        let storage = MemoryStorage::new();
        let first = resolve_session_id(&storage);
        let second = resolve_session_id(&storage);
        assert_eq!(first, second);
        assert_eq!(
            storage.get(SESSION_STORAGE_KEY).unwrap().as_deref(),
            Some(first.as_str())
        );
        assert!(uuid::Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn test_blank_stored_id_is_replaced() {
        let storage = MemoryStorage::new();
        storage.set(SESSION_STORAGE_KEY, " ").unwrap();
        let id = resolve_session_id(&storage);
        assert!(!id.trim().is_empty());
    }

    #[test]
    fn test_unavailable_storage_still_yields_id() {
        let id = resolve_session_id(&BrokenStorage);
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }
}
