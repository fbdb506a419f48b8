//! Application launcher state machine.
//!
//! The launcher owns the installed and available lists, the search filter, and keyboard
//! selection. It never touches the backend or the window manager itself: key handling returns a
//! [`LauncherCommand`] and the UI layer performs the I/O or dispatch it describes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{desktop_config, panel_catalog, PanelManifest};
use crate::resource::{RequestTicket, ResourceState, ResourceTracker};
use crate::search::{filter_apps, SearchOptions};

const DEFAULT_APP_ICON: &str = "package";

/// An application the launcher can show, either a built-in panel or a backend package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

fn default_icon() -> String {
    DEFAULT_APP_ICON.to_string()
}

impl AppEntry {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        categories: Vec<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: slugify(&name),
            name,
            icon: default_icon(),
            description: description.into(),
            categories,
        }
    }

    pub fn from_manifest(manifest: &PanelManifest) -> Self {
        Self {
            id: manifest.app_id.clone(),
            name: manifest.display_name.clone(),
            icon: manifest.icon.clone(),
            description: manifest.description.clone(),
            categories: manifest.categories.clone(),
        }
    }
}

/// Lowercase, dash-separated identifier derived from a display name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Decodes a package listing.
///
/// Accepts a bare array or an object wrapping one under `packages`, `apps` or `results`. Array
/// items may be full entries or plain name strings; unusable items are skipped.
pub fn parse_app_entries(body: &Value) -> Vec<AppEntry> {
    let items = body.as_array().or_else(|| {
        ["packages", "apps", "results"]
            .iter()
            .find_map(|key| body.get(key).and_then(Value::as_array))
    });
    let Some(items) = items else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) if !name.trim().is_empty() => {
                Some(AppEntry::new(name.as_str(), "", Vec::new()))
            }
            Value::Object(_) => serde_json::from_value::<AppEntry>(item.clone()).ok(),
            _ => None,
        })
        .filter(|entry| !entry.name.trim().is_empty())
        .map(|mut entry| {
            if entry.id.is_empty() {
                entry.id = slugify(&entry.name);
            }
            entry
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LauncherTab {
    #[default]
    Installed,
    Available,
}

impl LauncherTab {
    pub const fn other(self) -> Self {
        match self {
            Self::Installed => Self::Available,
            Self::Available => Self::Installed,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Installed => "Installed",
            Self::Available => "Available",
        }
    }
}

/// Transient launcher UI state, reset whenever the overlay opens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LauncherState {
    pub open: bool,
    pub selected_index: usize,
    pub current_tab: LauncherTab,
    pub search_filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Tab,
}

impl LauncherKey {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowDown" => Some(Self::ArrowDown),
            "ArrowUp" => Some(Self::ArrowUp),
            "Enter" => Some(Self::Enter),
            "Escape" => Some(Self::Escape),
            "Tab" => Some(Self::Tab),
            _ => None,
        }
    }
}

/// Work requested by the launcher that the UI layer must carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LauncherCommand {
    Launch(AppEntry),
    /// Confirm with the user, then install the named package.
    Install(String),
    /// The available tab needs (re)fetching for the current filter.
    SearchAvailable(String),
    Closed,
}

/// Returns whether a keydown opens the launcher (`Alt+Space` or `Meta+Space`).
pub fn is_launcher_hotkey(key: &str, code: &str, alt: bool, meta: bool) -> bool {
    (alt || meta) && (key == " " || code == "Space")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Launcher {
    pub state: LauncherState,
    builtin: Vec<AppEntry>,
    installed: ResourceTracker<Vec<AppEntry>>,
    available: ResourceTracker<Vec<AppEntry>>,
    options: SearchOptions,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::from_catalog()
    }
}

impl Launcher {
    pub fn new(builtin: Vec<AppEntry>, options: SearchOptions) -> Self {
        Self {
            state: LauncherState::default(),
            builtin,
            installed: ResourceTracker::new("installed apps"),
            available: ResourceTracker::new("available apps"),
            options,
        }
    }

    /// Launcher over the built-in panel catalog with configured search options.
    pub fn from_catalog() -> Self {
        Self::new(
            panel_catalog().iter().map(AppEntry::from_manifest).collect(),
            desktop_config().launcher.search_options(),
        )
    }

    /// Shows the overlay with a fresh state.
    pub fn open(&mut self) {
        self.state = LauncherState {
            open: true,
            ..LauncherState::default()
        };
    }

    pub fn close(&mut self) {
        self.state = LauncherState::default();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.search_filter = query.into();
        self.state.selected_index = 0;
    }

    pub fn switch_tab(&mut self, tab: LauncherTab) {
        self.state.current_tab = tab;
        self.state.selected_index = 0;
    }

    pub fn select(&mut self, index: usize) {
        self.state.selected_index = index;
    }

    pub fn begin_installed_refresh(&mut self) -> RequestTicket {
        self.installed.begin()
    }

    pub fn finish_installed_refresh<E: std::fmt::Display>(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<AppEntry>, E>,
    ) -> bool {
        self.installed.finish(ticket, result)
    }

    pub fn begin_available_search(&mut self) -> RequestTicket {
        self.available.begin()
    }

    pub fn finish_available_search<E: std::fmt::Display>(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<AppEntry>, E>,
    ) -> bool {
        self.available.finish(ticket, result)
    }

    /// Load state of the active tab's backend list.
    pub fn tab_status(&self) -> &ResourceState<Vec<AppEntry>> {
        match self.state.current_tab {
            LauncherTab::Installed => self.installed.state(),
            LauncherTab::Available => self.available.state(),
        }
    }

    /// Entries of the active tab before filtering.
    ///
    /// The installed tab always lists built-in panels, followed by backend packages that do not
    /// share an id with one.
    pub fn tab_entries(&self) -> Vec<AppEntry> {
        match self.state.current_tab {
            LauncherTab::Installed => {
                let mut entries = self.builtin.clone();
                if let Some(packages) = self.installed.state().ready() {
                    entries.extend(
                        packages
                            .iter()
                            .filter(|p| !self.builtin.iter().any(|b| b.id == p.id))
                            .cloned(),
                    );
                }
                entries
            }
            LauncherTab::Available => self
                .available
                .state()
                .ready()
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Filtered, ordered entries for display.
    pub fn results(&self, running_titles: &[String]) -> Vec<AppEntry> {
        filter_apps(
            &self.tab_entries(),
            &self.state.search_filter,
            running_titles,
            &self.options,
        )
    }

    pub fn selected(&self, running_titles: &[String]) -> Option<AppEntry> {
        self.results(running_titles)
            .into_iter()
            .nth(self.state.selected_index)
    }

    /// Applies a navigation key and returns the work it triggers, if any.
    pub fn handle_key(
        &mut self,
        key: LauncherKey,
        running_titles: &[String],
    ) -> Option<LauncherCommand> {
        match key {
            LauncherKey::ArrowDown => {
                let count = self.results(running_titles).len();
                self.state.selected_index =
                    (self.state.selected_index + 1).min(count.saturating_sub(1));
                None
            }
            LauncherKey::ArrowUp => {
                self.state.selected_index = self.state.selected_index.saturating_sub(1);
                None
            }
            LauncherKey::Enter => {
                let entry = self.selected(running_titles)?;
                match self.state.current_tab {
                    LauncherTab::Installed => {
                        self.close();
                        Some(LauncherCommand::Launch(entry))
                    }
                    LauncherTab::Available => Some(LauncherCommand::Install(entry.name)),
                }
            }
            LauncherKey::Escape => {
                self.close();
                Some(LauncherCommand::Closed)
            }
            LauncherKey::Tab => {
                let next = self.state.current_tab.other();
                self.switch_tab(next);
                (next == LauncherTab::Available)
                    .then(|| LauncherCommand::SearchAvailable(self.state.search_filter.clone()))
            }
        }
    }
}
