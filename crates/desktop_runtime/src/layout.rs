//! Layout templates and the geometry functions that place windows on the desktop.
//!
//! Every function here is pure: it maps a viewport and a window count onto rectangles. Cell
//! edges are computed as `origin + i * extent / n` in integer space, so adjacent cells share
//! their edge exactly and a tiling layout covers the viewport without gaps or overlap.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::model::{WindowRect, MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH};

pub const DEFAULT_CASCADE_STEP: i32 = 30;
const DEFAULT_SPLIT_RATIO: f64 = 0.5;
const DEFAULT_MASTER_RATIO: f64 = 0.6;
const MIN_RATIO: f64 = 0.1;
const MAX_RATIO: f64 = 0.9;
const MAX_GRID_DIMENSION: u32 = 12;

/// A named geometry rule applicable to the current window set.
///
/// `kind` is kept as the raw wire string so templates saved by newer builds (or typed by hand)
/// still load; [`LayoutTemplate::geometry`] decides what the string means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTemplate {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: Value,
}

impl LayoutTemplate {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        config: Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            config,
        }
    }

    /// Resolves the template into a geometry rule.
    ///
    /// Unknown kinds, and known kinds whose config is missing or invalid, resolve to
    /// [`LayoutGeometry::FullBleed`].
    pub fn geometry(&self) -> LayoutGeometry {
        let resolved = match self.kind.as_str() {
            "grid" => parse_config::<GridConfig>(&self.config)
                .filter(|c| {
                    (1..=MAX_GRID_DIMENSION).contains(&c.rows)
                        && (1..=MAX_GRID_DIMENSION).contains(&c.cols)
                })
                .map(|c| LayoutGeometry::Grid {
                    rows: c.rows,
                    cols: c.cols,
                }),
            "cascade" => parse_config::<CascadeConfig>(&self.config)
                .filter(|c| c.step > 0)
                .map(|c| LayoutGeometry::Cascade { step: c.step }),
            "vertical" => parse_config::<SplitConfig>(&self.config)
                .and_then(|c| clamp_ratio(c.ratio))
                .map(|ratio| LayoutGeometry::Vertical { ratio }),
            "horizontal" => parse_config::<SplitConfig>(&self.config)
                .and_then(|c| clamp_ratio(c.ratio))
                .map(|ratio| LayoutGeometry::Horizontal { ratio }),
            "master-stack" => parse_config::<MasterStackConfig>(&self.config).and_then(|c| {
                clamp_ratio(c.master_ratio).map(|master_ratio| LayoutGeometry::MasterStack {
                    master_ratio,
                    stack_direction: c.stack_direction,
                })
            }),
            "custom" => parse_config::<CustomConfig>(&self.config)
                .filter(|c| !c.rects.is_empty() && c.rects.iter().all(FractionalRect::is_valid))
                .map(|c| LayoutGeometry::Custom { rects: c.rects }),
            _ => None,
        };
        resolved.unwrap_or(LayoutGeometry::FullBleed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackDirection {
    #[default]
    Right,
    Bottom,
}

/// Rectangle expressed in viewport fractions (`0.0..=1.0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractionalRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl FractionalRect {
    fn is_valid(&self) -> bool {
        let unit = 0.0..=1.0;
        unit.contains(&self.x)
            && unit.contains(&self.y)
            && self.w > 0.0
            && self.h > 0.0
            && self.x + self.w <= 1.0 + f64::EPSILON
            && self.y + self.h <= 1.0 + f64::EPSILON
    }

    fn to_pixels(self, viewport: WindowRect) -> WindowRect {
        let x = ratio_extent(viewport.w, self.x);
        let y = ratio_extent(viewport.h, self.y);
        let right = ratio_extent(viewport.w, self.x + self.w);
        let bottom = ratio_extent(viewport.h, self.y + self.h);
        WindowRect {
            x: viewport.x + x,
            y: viewport.y + y,
            w: right - x,
            h: bottom - y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutGeometry {
    Grid {
        rows: u32,
        cols: u32,
    },
    Cascade {
        step: i32,
    },
    /// Side-by-side split; the first window gets `ratio` of the width.
    Vertical {
        ratio: f64,
    },
    /// Top/bottom split; the first window gets `ratio` of the height.
    Horizontal {
        ratio: f64,
    },
    MasterStack {
        master_ratio: f64,
        stack_direction: StackDirection,
    },
    Custom {
        rects: Vec<FractionalRect>,
    },
    FullBleed,
}

impl LayoutGeometry {
    /// Whether the rule places windows without overlap, which makes it usable in tiling mode.
    pub fn tiles_viewport(&self) -> bool {
        matches!(
            self,
            Self::Grid { .. }
                | Self::Vertical { .. }
                | Self::Horizontal { .. }
                | Self::MasterStack { .. }
        )
    }

    /// Computes one rectangle per window, in window order.
    pub fn arrange(&self, viewport: WindowRect, count: usize) -> Vec<WindowRect> {
        if count == 0 {
            return Vec::new();
        }
        match self {
            Self::Grid { rows, cols } => grid(viewport, *rows as usize, *cols as usize, count),
            Self::Cascade { step } => cascade(viewport, *step, count),
            Self::Vertical { ratio } => split(viewport, *ratio, count, SplitAxis::Columns),
            Self::Horizontal { ratio } => split(viewport, *ratio, count, SplitAxis::Rows),
            Self::MasterStack {
                master_ratio,
                stack_direction: StackDirection::Right,
            } => split(viewport, *master_ratio, count, SplitAxis::Columns),
            Self::MasterStack {
                master_ratio,
                stack_direction: StackDirection::Bottom,
            } => split(viewport, *master_ratio, count, SplitAxis::Rows),
            Self::Custom { rects } => (0..count)
                .map(|i| rects[i.min(rects.len() - 1)].to_pixels(viewport))
                .collect(),
            Self::FullBleed => vec![viewport; count],
        }
    }
}

/// Automatic tiling used when no template drives tiling mode.
///
/// Windows fill a near-square grid (`cols = ceil(sqrt(n))`) row by row; the last row's cells
/// stretch so the union is exactly the viewport.
pub fn auto_tile(viewport: WindowRect, count: usize) -> Vec<WindowRect> {
    if count == 0 {
        return Vec::new();
    }
    let mut cols = 1;
    while cols * cols < count {
        cols += 1;
    }
    let rows = count.div_ceil(cols);
    let last_row_len = count - cols * (rows - 1);

    (0..count)
        .map(|index| {
            let row = index / cols;
            let in_row = if row + 1 == rows { last_row_len } else { cols };
            let (x, w) = span(viewport.x, viewport.w, in_row, index % cols);
            let (y, h) = span(viewport.y, viewport.h, rows, row);
            WindowRect { x, y, w, h }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitAxis {
    /// First region on the left, the rest stacked top-to-bottom on the right.
    Columns,
    /// First region on top, the rest side by side underneath.
    Rows,
}

fn span(origin: i32, extent: i32, parts: usize, index: usize) -> (i32, i32) {
    let extent = i64::from(extent.max(0));
    let parts = parts.max(1) as i64;
    let index = index as i64;
    let start = extent * index / parts;
    let end = extent * (index + 1) / parts;
    (origin + start as i32, (end - start) as i32)
}

fn ratio_extent(extent: i32, ratio: f64) -> i32 {
    ((f64::from(extent) * ratio).round() as i32).clamp(0, extent.max(0))
}

fn clamp_ratio(ratio: f64) -> Option<f64> {
    ratio
        .is_finite()
        .then(|| ratio.clamp(MIN_RATIO, MAX_RATIO))
}

fn grid(viewport: WindowRect, rows: usize, cols: usize, count: usize) -> Vec<WindowRect> {
    let cells = rows * cols;
    let cell = |index: usize| {
        let (x, w) = span(viewport.x, viewport.w, cols, index % cols);
        let (y, h) = span(viewport.y, viewport.h, rows, index / cols);
        WindowRect { x, y, w, h }
    };
    if count <= cells {
        return (0..count).map(cell).collect();
    }

    // Overflow shares the last cell in equal vertical strips.
    let last = cell(cells - 1);
    let shared = count - cells + 1;
    let mut rects: Vec<WindowRect> = (0..cells - 1).map(cell).collect();
    rects.extend((0..shared).map(|k| {
        let (x, w) = span(last.x, last.w, shared, k);
        WindowRect { x, w, ..last }
    }));
    rects
}

fn split(viewport: WindowRect, ratio: f64, count: usize, axis: SplitAxis) -> Vec<WindowRect> {
    if count == 1 {
        return vec![viewport];
    }
    let rest_count = count - 1;
    let (first, rest) = match axis {
        SplitAxis::Columns => {
            let w = ratio_extent(viewport.w, ratio);
            (
                WindowRect { w, ..viewport },
                WindowRect {
                    x: viewport.x + w,
                    w: viewport.w - w,
                    ..viewport
                },
            )
        }
        SplitAxis::Rows => {
            let h = ratio_extent(viewport.h, ratio);
            (
                WindowRect { h, ..viewport },
                WindowRect {
                    y: viewport.y + h,
                    h: viewport.h - h,
                    ..viewport
                },
            )
        }
    };

    let mut rects = Vec::with_capacity(count);
    rects.push(first);
    rects.extend((0..rest_count).map(|i| match axis {
        SplitAxis::Columns => {
            let (y, h) = span(rest.y, rest.h, rest_count, i);
            WindowRect { y, h, ..rest }
        }
        SplitAxis::Rows => {
            let (x, w) = span(rest.x, rest.w, rest_count, i);
            WindowRect { x, w, ..rest }
        }
    }));
    rects
}

fn cascade(viewport: WindowRect, step: i32, count: usize) -> Vec<WindowRect> {
    let w = (viewport.w * 3 / 5).max(MIN_WINDOW_WIDTH).min(viewport.w.max(1));
    let h = (viewport.h * 3 / 5).max(MIN_WINDOW_HEIGHT).min(viewport.h.max(1));
    let room_x = (viewport.w - w).max(0) / step;
    let room_y = (viewport.h - h).max(0) / step;
    let positions = (room_x.min(room_y) + 1).max(1) as usize;

    (0..count)
        .map(|i| {
            let k = (i % positions) as i32;
            WindowRect {
                x: viewport.x + k * step,
                y: viewport.y + k * step,
                w,
                h,
            }
        })
        .collect()
}

#[derive(Deserialize)]
struct GridConfig {
    rows: u32,
    cols: u32,
}

#[derive(Deserialize)]
struct SplitConfig {
    #[serde(default = "default_split_ratio")]
    ratio: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MasterStackConfig {
    #[serde(default = "default_master_ratio")]
    master_ratio: f64,
    #[serde(default)]
    stack_direction: StackDirection,
}

#[derive(Deserialize)]
struct CascadeConfig {
    #[serde(default = "default_cascade_step")]
    step: i32,
}

#[derive(Deserialize)]
struct CustomConfig {
    rects: Vec<FractionalRect>,
}

fn default_split_ratio() -> f64 {
    DEFAULT_SPLIT_RATIO
}

fn default_master_ratio() -> f64 {
    DEFAULT_MASTER_RATIO
}

fn default_cascade_step() -> i32 {
    DEFAULT_CASCADE_STEP
}

fn parse_config<T: DeserializeOwned>(config: &Value) -> Option<T> {
    let config = if config.is_null() {
        json!({})
    } else {
        config.clone()
    };
    serde_json::from_value(config).ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout template needs a name")]
    MissingName,
    #[error("layout template needs a type")]
    MissingType,
    #[error("built-in layout `{0}` cannot be modified")]
    BuiltinImmutable(String),
    #[error("layout template `{0}` not found")]
    NotFound(String),
}

/// Default template set shipped with the desktop.
pub fn builtin_layout_templates() -> Vec<LayoutTemplate> {
    vec![
        LayoutTemplate::new("grid-2x2", "Grid 2×2", "grid", json!({ "rows": 2, "cols": 2 })),
        LayoutTemplate::new("grid-2x3", "Grid 2×3", "grid", json!({ "rows": 2, "cols": 3 })),
        LayoutTemplate::new("grid-3x3", "Grid 3×3", "grid", json!({ "rows": 3, "cols": 3 })),
        LayoutTemplate::new(
            "cascade",
            "Cascade",
            "cascade",
            json!({ "step": DEFAULT_CASCADE_STEP }),
        ),
        LayoutTemplate::new(
            "vertical-split",
            "Vertical Split",
            "vertical",
            json!({ "ratio": 0.5 }),
        ),
        LayoutTemplate::new(
            "horizontal-split",
            "Horizontal Split",
            "horizontal",
            json!({ "ratio": 0.5 }),
        ),
        LayoutTemplate::new(
            "master-stack",
            "Master + Stack",
            "master-stack",
            json!({ "masterRatio": DEFAULT_MASTER_RATIO, "stackDirection": "right" }),
        ),
        LayoutTemplate::new(
            "master-stack-bottom",
            "Master + Bottom Stack",
            "master-stack",
            json!({ "masterRatio": DEFAULT_MASTER_RATIO, "stackDirection": "bottom" }),
        ),
    ]
}

/// Built-in templates plus the user's saved templates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutTemplateStore {
    user: Vec<LayoutTemplate>,
}

impl LayoutTemplateStore {
    /// Rebuilds a store from persisted user templates, dropping entries that would shadow a
    /// built-in and keeping the last entry per id.
    pub fn from_user_templates(templates: Vec<LayoutTemplate>) -> Self {
        let mut store = Self::default();
        for template in templates {
            if let Err(err) = store.save(template) {
                leptos::logging::warn!("dropping stored layout template: {err}");
            }
        }
        store
    }

    /// Folds persisted templates under the ones already saved this session.
    ///
    /// Stored entries keep their persisted order; a session template with the same id replaces
    /// the stored one, and session-only templates follow.
    pub fn merge_stored(&mut self, stored: Vec<LayoutTemplate>) {
        let session = std::mem::take(&mut self.user);
        let mut merged = Self::from_user_templates(stored);
        for template in session {
            if let Err(err) = merged.save(template) {
                leptos::logging::warn!("dropping layout template: {err}");
            }
        }
        *self = merged;
    }

    pub fn is_builtin(id: &str) -> bool {
        builtin_layout_templates().iter().any(|t| t.id == id)
    }

    /// Built-ins first, then user templates in save order.
    pub fn templates(&self) -> Vec<LayoutTemplate> {
        let mut all = builtin_layout_templates();
        all.extend(self.user.iter().cloned());
        all
    }

    pub fn user_templates(&self) -> &[LayoutTemplate] {
        &self.user
    }

    pub fn find(&self, id: &str) -> Option<LayoutTemplate> {
        self.user
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .or_else(|| builtin_layout_templates().into_iter().find(|t| t.id == id))
    }

    /// Inserts or replaces a user template by id.
    ///
    /// # Errors
    ///
    /// Fails when `name` or `type` is blank or the id belongs to a built-in.
    pub fn save(&mut self, template: LayoutTemplate) -> Result<(), LayoutError> {
        if template.name.trim().is_empty() {
            return Err(LayoutError::MissingName);
        }
        if template.kind.trim().is_empty() {
            return Err(LayoutError::MissingType);
        }
        if Self::is_builtin(&template.id) {
            return Err(LayoutError::BuiltinImmutable(template.id));
        }
        match self.user.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template,
            None => self.user.push(template),
        }
        Ok(())
    }

    /// Removes a user template.
    ///
    /// # Errors
    ///
    /// Fails for built-in ids and unknown ids.
    pub fn delete(&mut self, id: &str) -> Result<(), LayoutError> {
        if Self::is_builtin(id) {
            return Err(LayoutError::BuiltinImmutable(id.to_string()));
        }
        let before = self.user.len();
        self.user.retain(|t| t.id != id);
        if self.user.len() == before {
            return Err(LayoutError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
