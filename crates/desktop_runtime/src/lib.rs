pub mod apps;
pub mod components;
pub mod config;
mod effect_executor;
pub mod host;
pub mod launcher;
pub mod layout;
pub mod model;
pub mod packages;
pub mod panels;
pub mod persistence;
pub mod reducer;
pub mod resource;
mod runtime_context;
pub mod search;
pub mod window_manager;

pub use components::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext, DesktopShell};
pub use config::{desktop_config, panel_catalog, DesktopConfig, PanelManifest};
pub use layout::{LayoutGeometry, LayoutTemplate, LayoutTemplateStore};
pub use model::*;
pub use persistence::{load_layout_templates, load_preferences, persist_preferences};
pub use reducer::{reduce_desktop, DesktopAction, RuntimeEffect};
