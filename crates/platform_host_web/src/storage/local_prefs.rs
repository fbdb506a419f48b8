//! `localStorage`-backed preference store.
//!
//! The browser API is synchronous; the async [`PrefsStore`] surface simply wraps it so the runtime
//! can treat every host uniformly.

use platform_host::{PrefsStore, PrefsStoreFuture};

#[derive(Debug, Clone, Copy, Default)]
/// Preference store backed by `window.localStorage`.
pub struct WebPrefsStore;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| "localStorage unavailable".to_string())
}

impl WebPrefsStore {
    /// Reads the raw text stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when `localStorage` is unavailable or the read throws.
    pub fn read(self, key: &str) -> Result<Option<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .get_item(key)
                .map_err(|e| format!("localStorage get_item({key}) failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    /// Writes raw text under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when `localStorage` is unavailable, full, or blocked.
    pub fn write(self, key: &str, raw_json: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .set_item(key, raw_json)
                .map_err(|e| format!("localStorage set_item({key}) failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, raw_json);
            Ok(())
        }
    }

    /// Removes `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when `localStorage` is unavailable or the removal throws.
    pub fn remove(self, key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .remove_item(key)
                .map_err(|e| format!("localStorage remove_item({key}) failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }
}

impl PrefsStore for WebPrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        let store = *self;
        Box::pin(async move { store.read(key) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.write(key, raw_json) })
    }

    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.remove(key) })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn native_fallback_is_empty_and_accepts_writes() {
        let store = WebPrefsStore;
        block_on(store.save_pref("wallpaper", "\"dunes\"")).expect("save");
        assert_eq!(block_on(store.load_pref("wallpaper")).expect("load"), None);
        block_on(store.delete_pref("wallpaper")).expect("delete");
    }
}
