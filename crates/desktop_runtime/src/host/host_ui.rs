#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

use crate::model::{WindowId, WindowRect};

pub(super) fn focus_window_content(window_id: WindowId) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let Some(element) =
            document.get_element_by_id(&crate::host::window_content_dom_id(window_id))
        else {
            return;
        };
        let Ok(element) = element.dyn_into::<web_sys::HtmlElement>() else {
            return;
        };
        // The window body is not in the DOM until the next frame.
        let callback = Closure::once_into_js(move || {
            let _ = element.focus();
        });
        let _ = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0);
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = window_id;
}

pub(super) fn desktop_viewport_rect(taskbar_height_px: i32) -> WindowRect {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let width = window
                .inner_width()
                .ok()
                .and_then(|value| value.as_f64())
                .map(|value| value as i32)
                .unwrap_or(1024);
            let height = window
                .inner_height()
                .ok()
                .and_then(|value| value.as_f64())
                .map(|value| value as i32)
                .unwrap_or(768);

            return WindowRect {
                x: 0,
                y: 0,
                w: width.max(320),
                h: (height - taskbar_height_px).max(220),
            };
        }
    }

    WindowRect {
        x: 0,
        y: 0,
        w: 1024,
        h: 768 - taskbar_height_px,
    }
}
