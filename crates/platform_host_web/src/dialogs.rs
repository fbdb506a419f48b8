//! Blocking browser dialogs.
//!
//! Validation failures surface through `alert()` and destructive actions are gated behind
//! `confirm()`. Native builds auto-accept so headless flows keep running.

/// Shows a blocking confirmation dialog and returns whether the user accepted.
pub fn confirm(message: &str) -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        true
    }
}

/// Shows a blocking alert dialog.
pub fn alert(message: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}
