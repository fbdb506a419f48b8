//! Lightweight preference storage contracts and adapters.
//!
//! Preferences are small JSON documents stored as text under a flat key (`windowOpacity`,
//! `wallpaper`, `useGradient`, saved layout templates). The browser adapter maps each key onto
//! `localStorage`; the memory adapter backs tests.

use std::{cell::RefCell, collections::BTreeMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};

/// Object-safe boxed future used by [`PrefsStore`] async methods.
pub type PrefsStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service for lightweight preference values (JSON stored as text per key).
pub trait PrefsStore {
    /// Loads the raw JSON text stored under `key`.
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>>;

    /// Stores raw JSON text under `key`, replacing any previous value.
    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>>;

    /// Removes `key`.
    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Preference store that remembers nothing; used where no client storage exists.
pub struct NoopPrefsStore;

impl PrefsStore for NoopPrefsStore {
    fn load_pref<'a>(
        &'a self,
        _key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_pref<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn delete_pref<'a>(&'a self, _key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory preference store. Clones share the same backing map.
pub struct MemoryPrefsStore {
    inner: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryPrefsStore {
    /// Returns the raw value stored under `key` without going through the async contract.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }

    /// Returns every stored key in lexical order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().keys().cloned().collect()
    }
}

impl PrefsStore for MemoryPrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { Ok(self.raw(key)) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner
                .borrow_mut()
                .insert(key.to_string(), raw_json.to_string());
            Ok(())
        })
    }

    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner.borrow_mut().remove(key);
            Ok(())
        })
    }
}

/// Loads and deserializes a typed preference value through a [`PrefsStore`].
///
/// # Errors
///
/// Returns an error when the store fails or the stored JSON does not match `T`.
pub async fn load_pref_with<S: PrefsStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, String> {
    let Some(raw) = store.load_pref(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| format!("pref `{key}` is malformed: {e}"))
}

/// Serializes and saves a typed preference value through a [`PrefsStore`].
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_pref_with<S: PrefsStore + ?Sized, T: Serialize + ?Sized>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.save_pref(key, &raw).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn memory_store_shares_state_between_clones() {
        let store = MemoryPrefsStore::default();
        let other = store.clone();
        let store_obj: &dyn PrefsStore = &store;

        block_on(store_obj.save_pref("windowOpacity", "0.85")).expect("save");
        assert_eq!(other.raw("windowOpacity"), Some("0.85".to_string()));

        block_on(store_obj.delete_pref("windowOpacity")).expect("delete");
        assert_eq!(block_on(other.load_pref("windowOpacity")).expect("load"), None);
    }

    #[test]
    fn typed_helpers_store_json_text() {
        let store = MemoryPrefsStore::default();
        block_on(save_pref_with(&store, "useGradient", &true)).expect("save");
        block_on(save_pref_with(&store, "wallpaper", "aurora")).expect("save");

        assert_eq!(store.raw("useGradient"), Some("true".to_string()));
        assert_eq!(store.raw("wallpaper"), Some("\"aurora\"".to_string()));
        let loaded: Option<bool> = block_on(load_pref_with(&store, "useGradient")).expect("load");
        assert_eq!(loaded, Some(true));
        assert_eq!(store.keys(), vec!["useGradient", "wallpaper"]);
    }

    #[test]
    fn malformed_pref_reports_the_key() {
        let store = MemoryPrefsStore::default();
        block_on(store.save_pref("windowOpacity", "not json")).expect("save");

        let err = block_on(load_pref_with::<_, f64>(&store, "windowOpacity"))
            .expect_err("malformed value");
        assert!(err.contains("windowOpacity"), "{err}");
    }

    #[test]
    fn noop_store_is_empty_and_successful() {
        let store = NoopPrefsStore;
        let store_obj: &dyn PrefsStore = &store;
        assert_eq!(block_on(store_obj.load_pref("k")).expect("load"), None);
        block_on(store_obj.save_pref("k", "{}")).expect("save");
        block_on(store_obj.delete_pref("k")).expect("delete");
    }
}
