use gloo::storage::{LocalStorage, Storage};

use crate::types::SessionId;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Key/value persistence for the session identifier
pub trait SessionStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str) -> Result<(), String>;
}

/// Browser local storage. Values are stored as raw strings, not JSON.
pub struct LocalSessionStore;

impl SessionStore for LocalSessionStore {
    fn load(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), String> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| format!("{:?}", e))
    }
}

/// `session_<timestamp>_<9 base36 chars>`
pub fn generate_session_id(now_ms: u64) -> SessionId {
    let mut bytes = [0u8; SUFFIX_LEN];
    if let Err(e) = getrandom::getrandom(&mut bytes) {
        log::warn!("No random source available ({}), deriving suffix from clock", e);
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (now_ms >> (i * 7)) as u8;
        }
    }
    let suffix: String = bytes
        .iter()
        .map(|b| BASE36[(*b as usize) % BASE36.len()] as char)
        .collect();
    SessionId::new(format!("session_{}_{}", now_ms, suffix))
}

/// Reuse the persisted identifier or create and persist a new one.
pub fn ensure_session_id(store: &impl SessionStore, key: &str, now_ms: u64) -> SessionId {
    let session_id = match store.load(key) {
        Some(existing) if !existing.is_empty() => SessionId::new(existing),
        _ => generate_session_id(now_ms),
    };
    if let Err(e) = store.save(key, session_id.as_str()) {
        log::warn!("Could not persist session id: {}", e);
    }
    session_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        items: RefCell<HashMap<String, String>>,
        writes: RefCell<usize>,
    }

    impl SessionStore for MemoryStore {
        fn load(&self, key: &str) -> Option<String> {
            self.items.borrow().get(key).cloned()
        }

        fn save(&self, key: &str, value: &str) -> Result<(), String> {
            *self.writes.borrow_mut() += 1;
            self.items
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct ReadOnlyStore;

    impl SessionStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> Option<String> {
            None
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), String> {
            Err("quota exceeded".to_string())
        }
    }

    #[test]
    fn test_generated_id_format() {
        let id = generate_session_id(1_700_000_000_000);
        let rest = id.as_str().strip_prefix("session_1700000000000_").unwrap();
        assert_eq!(rest.len(), SUFFIX_LEN);
        assert!(rest.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = generate_session_id(42);
        let b = generate_session_id(42);
        assert_ne!(a, b);
    }

    #[test]
    fn test_ensure_creates_and_persists() {
        let store = MemoryStore::default();
        let id = ensure_session_id(&store, "agentSessionId", 1);
        assert_eq!(store.load("agentSessionId").as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_ensure_reuses_existing_id() {
        let store = MemoryStore::default();
        let first = ensure_session_id(&store, "agentSessionId", 1);
        let second = ensure_session_id(&store, "agentSessionId", 2);
        let third = ensure_session_id(&store, "agentSessionId", 3);
        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(*store.writes.borrow(), 3);
    }

    #[test]
    fn test_ensure_replaces_empty_value() {
        let store = MemoryStore::default();
        store.save("agentSessionId", "").unwrap();
        let id = ensure_session_id(&store, "agentSessionId", 7);
        assert!(id.as_str().starts_with("session_7_"));
    }

    #[test]
    fn test_ensure_survives_write_failure() {
        let id = ensure_session_id(&ReadOnlyStore, "agentSessionId", 9);
        assert!(id.as_str().starts_with("session_9_"));
    }
}
