//! Build-time desktop configuration and panel catalog.
//!
//! `build.rs` validates `config/desktop.toml` and `config/panels/*.toml` and embeds them as JSON;
//! this module decodes them once per process. Any field missing from the embedded JSON takes the
//! serde default.

use std::sync::OnceLock;

use leptos::logging;
use serde::Deserialize;

use crate::model::{
    DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH,
};
use crate::search::SearchOptions;

include!(concat!(env!("OUT_DIR"), "/desktop_catalog_generated.rs"));

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub result_limit: usize,
    pub threshold: f64,
    pub name_weight: f64,
    pub description_weight: f64,
    pub categories_weight: f64,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        let defaults = SearchOptions::default();
        Self {
            result_limit: defaults.result_limit,
            threshold: defaults.threshold,
            name_weight: defaults.name_weight,
            description_weight: defaults.description_weight,
            categories_weight: defaults.category_weight,
        }
    }
}

impl LauncherConfig {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            threshold: self.threshold,
            name_weight: self.name_weight,
            description_weight: self.description_weight,
            category_weight: self.categories_weight,
            result_limit: self.result_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Abort deadline for panel fetches without their own timeout; `0` disables it.
    pub default_timeout_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WallpaperPreset {
    pub id: String,
    pub label: String,
    pub primary: String,
    pub secondary: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// Prefix for every backend request; empty means same origin.
    pub api_base_url: String,
    pub taskbar_height: i32,
    pub default_window_width: i32,
    pub default_window_height: i32,
    pub launcher: LauncherConfig,
    pub requests: RequestConfig,
    pub wallpapers: Vec<WallpaperPreset>,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            taskbar_height: 40,
            default_window_width: DEFAULT_WINDOW_WIDTH,
            default_window_height: DEFAULT_WINDOW_HEIGHT,
            launcher: LauncherConfig::default(),
            requests: RequestConfig::default(),
            wallpapers: Vec::new(),
        }
    }
}

impl DesktopConfig {
    pub fn wallpaper(&self, id: &str) -> Option<&WallpaperPreset> {
        self.wallpapers.iter().find(|w| w.id == id)
    }

    /// Timeout for a panel request, falling back to the global default.
    pub fn request_timeout(&self, panel_timeout_ms: Option<u32>) -> Option<u32> {
        panel_timeout_ms
            .or(Some(self.requests.default_timeout_ms))
            .filter(|ms| *ms > 0)
    }

    /// Size for windows whose request names none, never below the minimum window size.
    pub fn default_window_size(&self) -> (i32, i32) {
        (
            self.default_window_width.max(MIN_WINDOW_WIDTH),
            self.default_window_height.max(MIN_WINDOW_HEIGHT),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelKind {
    /// Generic list/CRUD panel over one endpoint.
    Resource,
    Wifi,
    DisplaySettings,
    LayoutTools,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WindowDefaults {
    pub width: i32,
    pub height: i32,
}

/// One catalog entry describing a built-in desktop panel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PanelManifest {
    pub app_id: String,
    pub display_name: String,
    pub icon: String,
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub kind: PanelKind,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Row fields shown as table columns, in order.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Row field used to address a single resource (`DELETE endpoint/<id>`).
    #[serde(default)]
    pub id_field: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u32>,
    pub window_defaults: WindowDefaults,
}

fn parse_or_default<T: Default + for<'de> Deserialize<'de>>(label: &str, raw: &str) -> T {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        logging::error!("embedded {label} is invalid, using defaults: {err}");
        T::default()
    })
}

/// Returns the desktop configuration embedded at build time.
pub fn desktop_config() -> &'static DesktopConfig {
    static CONFIG: OnceLock<DesktopConfig> = OnceLock::new();
    CONFIG.get_or_init(|| parse_or_default("desktop config", DESKTOP_CONFIG_JSON))
}

/// Returns the built-in panel catalog in declaration order.
pub fn panel_catalog() -> &'static [PanelManifest] {
    static CATALOG: OnceLock<Vec<PanelManifest>> = OnceLock::new();
    CATALOG.get_or_init(|| parse_or_default("panel catalog", PANEL_CATALOG_JSON))
}

pub fn panel_manifest(app_id: &str) -> Option<&'static PanelManifest> {
    panel_catalog().iter().find(|panel| panel.app_id == app_id)
}
