//! Host-side runtime helpers for executing reducer effects and querying browser environment state.
//!
//! Effect execution, boot hydration, and viewport queries sit behind [`DesktopHostContext`] so the
//! reducer stays pure and the services can be swapped for in-memory adapters.

mod boot;
mod host_ui;
mod persistence_effects;

use std::rc::Rc;

use leptos::Callback;
use platform_host::{BackendApi, HostServices, PrefsStore};

use crate::{
    model::{WindowId, WindowRect},
    reducer::{DesktopAction, RuntimeEffect},
    runtime_context::DesktopRuntimeContext,
};

#[derive(Clone)]
/// Host service bundle for desktop runtime side effects.
pub struct DesktopHostContext {
    services: HostServices,
}

impl DesktopHostContext {
    pub fn new(services: HostServices) -> Self {
        Self { services }
    }

    /// Returns the configured preference store.
    pub fn prefs_store(&self) -> Rc<dyn PrefsStore> {
        self.services.prefs.clone()
    }

    /// Returns the configured backend transport.
    pub fn backend_api(&self) -> Rc<dyn BackendApi> {
        self.services.api.clone()
    }

    pub fn host_strategy_name(&self) -> &'static str {
        self.services.host_strategy.as_str()
    }

    /// Loads stored preferences and user layout templates, then dispatches them.
    pub fn install_boot_hydration(&self, dispatch: Callback<DesktopAction>) {
        boot::install_boot_hydration(self.clone(), dispatch);
    }

    /// Executes a single [`RuntimeEffect`] emitted by the reducer.
    pub fn run_runtime_effect(&self, runtime: DesktopRuntimeContext, effect: RuntimeEffect) {
        match effect {
            RuntimeEffect::PersistPreferences => {
                persistence_effects::persist_preferences(self.clone(), runtime)
            }
            RuntimeEffect::PersistLayoutTemplates => {
                persistence_effects::persist_layout_templates(self.clone(), runtime)
            }
            RuntimeEffect::FocusWindowContent(window_id) => self.focus_window_content(window_id),
        }
    }

    /// Moves keyboard focus into a window body.
    ///
    /// Window bodies render [`window_content_dom_id`] and are focusable.
    pub fn focus_window_content(&self, window_id: WindowId) {
        host_ui::focus_window_content(window_id);
    }

    /// Returns the current desktop viewport rect available to the window manager.
    pub fn desktop_viewport_rect(&self, taskbar_height_px: i32) -> WindowRect {
        host_ui::desktop_viewport_rect(taskbar_height_px)
    }
}

/// DOM id of a window's content container.
pub fn window_content_dom_id(window_id: WindowId) -> String {
    format!("desktop-window-content-{}", window_id.0)
}
