//! Shared window-manager transition helpers used by the desktop reducer.

use crate::layout::{auto_tile, LayoutGeometry};
use crate::model::{
    DesktopState, LayoutMode, ResizeEdge, WindowId, WindowRect, MIN_WINDOW_HEIGHT,
    MIN_WINDOW_WIDTH,
};

const STAGGER_STEP: i32 = 20;
const STAGGER_SLOTS: i32 = 8;

/// Focuses and raises `window_id`, ensuring it is the top/focused non-minimized window.
///
/// Returns `false` when the window does not exist.
pub fn focus_window_internal(state: &mut DesktopState, window_id: WindowId) -> bool {
    let Some(index) = state.windows.iter().position(|w| w.id == window_id) else {
        return false;
    };

    let already_focused_top = index + 1 == state.windows.len()
        && state
            .windows
            .get(index)
            .map(|w| w.is_focused && !w.minimized)
            .unwrap_or(false);
    if already_focused_top {
        return true;
    }

    for window in &mut state.windows {
        window.is_focused = false;
    }
    let mut window = state.windows.remove(index);
    window.is_focused = true;
    window.minimized = false;
    state.windows.push(window);
    normalize_window_stack(state);
    true
}

/// Normalizes z-index ordering and focus invariants for all managed windows.
pub fn normalize_window_stack(state: &mut DesktopState) {
    let mut has_focused = false;
    for (idx, window) in state.windows.iter_mut().enumerate() {
        window.z_index = (idx + 1) as u32;
        if window.minimized {
            window.is_focused = false;
        }
        if window.is_focused {
            if has_focused {
                window.is_focused = false;
            } else {
                has_focused = true;
            }
        }
    }

    if !has_focused {
        if let Some(last_non_minimized) = state.windows.iter_mut().rev().find(|w| !w.minimized) {
            last_non_minimized.is_focused = true;
        }
    }
}

/// Applies resize deltas for a given edge/corner drag.
pub fn resize_rect(start: WindowRect, edge: ResizeEdge, dx: i32, dy: i32) -> WindowRect {
    match edge {
        ResizeEdge::East => WindowRect {
            w: start.w + dx,
            ..start
        },
        ResizeEdge::West => WindowRect {
            x: start.x + dx,
            w: start.w - dx,
            ..start
        },
        ResizeEdge::South => WindowRect {
            h: start.h + dy,
            ..start
        },
        ResizeEdge::North => WindowRect {
            y: start.y + dy,
            h: start.h - dy,
            ..start
        },
        ResizeEdge::NorthEast => WindowRect {
            y: start.y + dy,
            h: start.h - dy,
            w: start.w + dx,
            ..start
        },
        ResizeEdge::NorthWest => WindowRect {
            x: start.x + dx,
            y: start.y + dy,
            w: start.w - dx,
            h: start.h - dy,
        },
        ResizeEdge::SouthEast => WindowRect {
            w: start.w + dx,
            h: start.h + dy,
            ..start
        },
        ResizeEdge::SouthWest => WindowRect {
            x: start.x + dx,
            w: start.w - dx,
            h: start.h + dy,
            ..start
        },
    }
}

/// Floating placement for a new window: staggered down-right from the viewport origin, wrapping
/// every eight windows.
pub fn staggered_rect(window_id: WindowId, viewport: WindowRect, w: i32, h: i32) -> WindowRect {
    let slot = ((window_id.0.saturating_sub(1)) % STAGGER_SLOTS as u64) as i32;
    let offset = slot * STAGGER_STEP;
    WindowRect {
        x: viewport.x + 40 + offset,
        y: viewport.y + 24 + offset,
        w,
        h,
    }
    .clamped_min(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT)
}

/// Stack indices of the windows a layout places: every non-minimized window, in creation order.
fn layout_targets(state: &DesktopState) -> Vec<usize> {
    let mut targets: Vec<usize> = state
        .windows
        .iter()
        .enumerate()
        .filter(|(_, w)| !w.minimized)
        .map(|(idx, _)| idx)
        .collect();
    targets.sort_by_key(|&idx| state.windows[idx].id);
    targets
}

fn place_windows(state: &mut DesktopState, targets: &[usize], rects: &[WindowRect]) {
    for (&idx, rect) in targets.iter().zip(rects) {
        let window = &mut state.windows[idx];
        window.rect = *rect;
        window.maximized = false;
        window.restore_rect = None;
    }
}

/// Writes `geometry` onto every non-minimized window.
///
/// Cascades also restack the windows so later cascade positions sit on top.
pub fn apply_geometry(state: &mut DesktopState, geometry: &LayoutGeometry) {
    let targets = layout_targets(state);
    let rects = geometry.arrange(state.viewport, targets.len());
    place_windows(state, &targets, &rects);

    if matches!(geometry, LayoutGeometry::Cascade { .. }) {
        state.windows.sort_by_key(|w| w.id);
        for window in &mut state.windows {
            window.is_focused = false;
        }
    }
    normalize_window_stack(state);
}

/// Geometry tiling mode follows: the active template when it tiles, otherwise `None` for the
/// automatic grid.
pub fn tiling_geometry(state: &DesktopState) -> Option<LayoutGeometry> {
    state
        .active_template
        .as_deref()
        .and_then(|id| state.templates.find(id))
        .map(|template| template.geometry())
        .filter(LayoutGeometry::tiles_viewport)
}

/// Re-tiles every non-minimized window in tiling mode; does nothing while floating.
///
/// Returns whether any geometry was written.
pub fn apply_tiling(state: &mut DesktopState) -> bool {
    if state.mode != LayoutMode::Tiling {
        return false;
    }
    let targets = layout_targets(state);
    if targets.is_empty() {
        return false;
    }
    let rects = match tiling_geometry(state) {
        Some(geometry) => geometry.arrange(state.viewport, targets.len()),
        None => auto_tile(state.viewport, targets.len()),
    };
    place_windows(state, &targets, &rects);
    true
}
