//! App registry: maps launcher ids to window handlers.
//!
//! Handlers are populated from the build-time panel catalog, so adding a panel means adding a
//! manifest under `config/panels/`. Ids without a handler launch a placeholder window.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::config::{panel_catalog, PanelKind, PanelManifest};
use crate::launcher::AppEntry;
use crate::model::{DesktopState, OpenWindowRequest, WindowContent};
use crate::reducer::DesktopAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppHandler {
    pub app_id: String,
    pub title: String,
    pub icon: String,
    pub kind: PanelKind,
    pub window_size: (i32, i32),
}

impl AppHandler {
    pub fn from_manifest(manifest: &PanelManifest) -> Self {
        Self {
            app_id: manifest.app_id.clone(),
            title: manifest.display_name.clone(),
            icon: manifest.icon.clone(),
            kind: manifest.kind,
            window_size: (manifest.window_defaults.width, manifest.window_defaults.height),
        }
    }

    pub fn open_request(&self) -> OpenWindowRequest {
        let mut req = OpenWindowRequest::app(self.app_id.clone(), self.title.clone());
        req.icon = Some(self.icon.clone());
        req.size = Some(self.window_size);
        req
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppRegistry {
    handlers: BTreeMap<String, AppHandler>,
}

impl AppRegistry {
    pub fn from_catalog(catalog: &[PanelManifest]) -> Self {
        let mut registry = Self::default();
        for manifest in catalog {
            registry.register(AppHandler::from_manifest(manifest));
        }
        registry
    }

    /// Adds or replaces the handler for its app id.
    pub fn register(&mut self, handler: AppHandler) {
        self.handlers.insert(handler.app_id.clone(), handler);
    }

    pub fn get(&self, app_id: &str) -> Option<&AppHandler> {
        self.handlers.get(app_id)
    }

    /// Window request for an entry: its handler's request, or a placeholder.
    pub fn open_request(&self, entry: &AppEntry) -> OpenWindowRequest {
        match self.get(&entry.id) {
            Some(handler) => {
                let mut req = handler.open_request();
                req.title = entry.name.clone();
                req
            }
            None => {
                let mut req = OpenWindowRequest::placeholder(entry.name.clone());
                req.icon = Some(entry.icon.clone());
                req
            }
        }
    }

    /// Chooses how to launch `entry`: a window whose title matches the entry name
    /// case-insensitively is focused, anything else opens a new window.
    pub fn launch_action(&self, state: &DesktopState, entry: &AppEntry) -> DesktopAction {
        match state.window_by_title(&entry.name) {
            Some(window) => DesktopAction::FocusWindow {
                window_id: window.id,
            },
            None => DesktopAction::OpenWindow(self.open_request(entry)),
        }
    }
}

/// Registry over the built-in panel catalog.
pub fn app_registry() -> &'static AppRegistry {
    static REGISTRY: OnceLock<AppRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| AppRegistry::from_catalog(panel_catalog()))
}

/// Handler kind for a window's content, if it is a registered app.
pub fn window_panel_kind(content: &WindowContent) -> Option<PanelKind> {
    match content {
        WindowContent::App { app_id } => app_registry().get(app_id).map(|h| h.kind),
        _ => None,
    }
}
