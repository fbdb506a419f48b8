use serde::{Deserialize, Serialize};

use crate::layout::LayoutTemplateStore;

pub const DEFAULT_WINDOW_WIDTH: i32 = 640;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 420;
/// Minimum allowed managed window width.
pub const MIN_WINDOW_WIDTH: i32 = 220;
/// Minimum allowed managed window height.
pub const MIN_WINDOW_HEIGHT: i32 = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    pub fn clamped_min(self, min_w: i32, min_h: i32) -> Self {
        Self {
            w: self.w.max(min_w),
            h: self.h.max(min_h),
            ..self
        }
    }

    pub const fn right(self) -> i32 {
        self.x + self.w
    }

    pub const fn bottom(self) -> i32 {
        self.y + self.h
    }

    pub fn area(self) -> i64 {
        i64::from(self.w.max(0)) * i64::from(self.h.max(0))
    }

    /// Returns whether the two rectangles share any interior area.
    pub fn overlaps(self, other: Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

impl Default for WindowRect {
    fn default() -> Self {
        Self {
            x: 48,
            y: 48,
            w: DEFAULT_WINDOW_WIDTH,
            h: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    #[default]
    Floating,
    Tiling,
}

impl LayoutMode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Floating => Self::Tiling,
            Self::Tiling => Self::Floating,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Floating => "floating",
            Self::Tiling => "tiling",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Floating => "Floating",
            Self::Tiling => "Tiling",
        }
    }
}

/// What a window renders inside its frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WindowContent {
    /// A registered panel, rendered by its registry handler.
    App { app_id: String },
    /// Caller-supplied markup.
    Html { html: String },
    /// Generic stand-in for apps without a handler.
    Placeholder { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowFlags {
    pub resizable: bool,
    pub minimizable: bool,
    pub maximizable: bool,
}

impl Default for WindowFlags {
    fn default() -> Self {
        Self {
            resizable: true,
            minimizable: true,
            maximizable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub title: String,
    pub icon: String,
    pub content: WindowContent,
    pub rect: WindowRect,
    pub restore_rect: Option<WindowRect>,
    pub z_index: u32,
    pub is_focused: bool,
    pub minimized: bool,
    pub maximized: bool,
    pub flags: WindowFlags,
}

impl WindowRecord {
    pub fn title_matches(&self, title: &str) -> bool {
        self.title.to_lowercase() == title.to_lowercase()
    }
}

pub const MIN_WINDOW_OPACITY: f64 = 0.3;
pub const DEFAULT_WALLPAPER: &str = "aurora";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesktopPreferences {
    pub window_opacity: f64,
    pub wallpaper: String,
    pub use_gradient: bool,
}

impl DesktopPreferences {
    pub fn clamp_opacity(opacity: f64) -> f64 {
        if opacity.is_nan() {
            return 1.0;
        }
        opacity.clamp(MIN_WINDOW_OPACITY, 1.0)
    }
}

impl Default for DesktopPreferences {
    fn default() -> Self {
        Self {
            window_opacity: 0.95,
            wallpaper: DEFAULT_WALLPAPER.to_string(),
            use_gradient: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesktopState {
    pub next_window_id: u64,
    /// Open windows in stacking order; the last entry is topmost.
    pub windows: Vec<WindowRecord>,
    pub mode: LayoutMode,
    /// Desktop area available to windows (excludes the taskbar).
    pub viewport: WindowRect,
    /// Template that tiling mode follows, if one was applied.
    pub active_template: Option<String>,
    pub templates: LayoutTemplateStore,
    pub preferences: DesktopPreferences,
    /// Handle of the most recently created window.
    pub last_opened: Option<WindowId>,
}

impl Default for DesktopState {
    fn default() -> Self {
        Self {
            next_window_id: 1,
            windows: Vec::new(),
            mode: LayoutMode::Floating,
            viewport: WindowRect::new(0, 0, 1280, 720),
            active_template: None,
            templates: LayoutTemplateStore::default(),
            preferences: DesktopPreferences::default(),
            last_opened: None,
        }
    }
}

impl DesktopState {
    pub fn focused_window_id(&self) -> Option<WindowId> {
        self.windows.iter().find(|w| w.is_focused).map(|w| w.id)
    }

    pub fn window(&self, window_id: WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.id == window_id)
    }

    /// Finds an open window whose title matches case-insensitively.
    pub fn window_by_title(&self, title: &str) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.title_matches(title))
    }

    /// Lowercased titles of every open window.
    pub fn running_titles(&self) -> Vec<String> {
        self.windows.iter().map(|w| w.title.to_lowercase()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenWindowRequest {
    pub title: String,
    pub icon: Option<String>,
    pub content: WindowContent,
    /// Explicit placement; `None` staggers the window.
    pub rect: Option<WindowRect>,
    /// Size used with staggered placement, as `(w, h)`.
    pub size: Option<(i32, i32)>,
    pub flags: WindowFlags,
}

impl OpenWindowRequest {
    pub fn new(title: impl Into<String>, content: WindowContent) -> Self {
        Self {
            title: title.into(),
            icon: None,
            content,
            rect: None,
            size: None,
            flags: WindowFlags::default(),
        }
    }

    pub fn html(title: impl Into<String>, html: impl Into<String>) -> Self {
        Self::new(title, WindowContent::Html { html: html.into() })
    }

    pub fn app(app_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(
            title,
            WindowContent::App {
                app_id: app_id.into(),
            },
        )
    }

    pub fn placeholder(title: impl Into<String>) -> Self {
        let title = title.into();
        let message = format!("{title} has no desktop panel yet.");
        Self::new(title, WindowContent::Placeholder { message })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeEdge {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeEdge {
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];

    pub const fn css_class(self) -> &'static str {
        match self {
            Self::North => "edge-n",
            Self::South => "edge-s",
            Self::East => "edge-e",
            Self::West => "edge-w",
            Self::NorthEast => "edge-ne",
            Self::NorthWest => "edge-nw",
            Self::SouthEast => "edge-se",
            Self::SouthWest => "edge-sw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub window_id: WindowId,
    pub pointer_start: PointerPosition,
    pub rect_start: WindowRect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSession {
    pub window_id: WindowId,
    pub edge: ResizeEdge,
    pub pointer_start: PointerPosition,
    pub rect_start: WindowRect,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionState {
    pub dragging: Option<DragSession>,
    pub resizing: Option<ResizeSession>,
}

impl InteractionState {
    pub fn is_active(&self) -> bool {
        self.dragging.is_some() || self.resizing.is_some()
    }
}
