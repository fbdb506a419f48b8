//! Reducer actions, side-effect intents, and transition logic for the desktop runtime.

use thiserror::Error;

use crate::config::desktop_config;
use crate::layout::{LayoutError, LayoutTemplate};
use crate::model::{
    DesktopPreferences, DesktopState, DragSession, InteractionState, LayoutMode,
    OpenWindowRequest, PointerPosition, ResizeEdge, ResizeSession, WindowId, WindowRecord,
    WindowRect, MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH,
};
use crate::window_manager::{
    apply_geometry, apply_tiling, focus_window_internal, normalize_window_stack, resize_rect,
    staggered_rect,
};

const DEFAULT_WINDOW_ICON: &str = "window";

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desktop`] to mutate [`DesktopState`].
pub enum DesktopAction {
    /// Open a new window using the supplied request.
    OpenWindow(OpenWindowRequest),
    /// Close a window by id.
    CloseWindow { window_id: WindowId },
    /// Focus (and raise) a window by id.
    FocusWindow { window_id: WindowId },
    MinimizeWindow { window_id: WindowId },
    /// Maximize a window to the desktop viewport.
    MaximizeWindow { window_id: WindowId },
    /// Restore a minimized or maximized window.
    RestoreWindow { window_id: WindowId },
    /// Taskbar button behavior: restore if minimized, minimize if focused, focus otherwise.
    ToggleTaskbarWindow { window_id: WindowId },
    /// Flip between floating and tiling mode.
    ToggleLayoutMode,
    /// Recompute tiling geometry for the current window set.
    ApplyTiling,
    /// Record the desktop area available to windows and re-tile.
    SetViewport { viewport: WindowRect },
    /// Write a template's geometry onto the open windows.
    ApplyLayoutTemplate { template_id: String },
    SaveLayoutTemplate { template: LayoutTemplate },
    DeleteLayoutTemplate { template_id: String },
    /// Replace user templates with a persisted set.
    HydrateLayoutTemplates { templates: Vec<LayoutTemplate> },
    BeginMove {
        window_id: WindowId,
        pointer: PointerPosition,
    },
    UpdateMove { pointer: PointerPosition },
    EndMove,
    BeginResize {
        window_id: WindowId,
        edge: ResizeEdge,
        pointer: PointerPosition,
    },
    UpdateResize { pointer: PointerPosition },
    EndResize,
    SetWindowOpacity { opacity: f64 },
    SetWallpaper { wallpaper: String },
    SetUseGradient { enabled: bool },
    /// Replace display preferences with persisted values.
    HydratePreferences { preferences: DesktopPreferences },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_desktop`] for the host layer to execute.
pub enum RuntimeEffect {
    /// Persist display preferences.
    PersistPreferences,
    /// Persist the user layout templates.
    PersistLayoutTemplates,
    /// Move keyboard focus into the window's content.
    FocusWindowContent(WindowId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for invalid actions.
pub enum ReducerError {
    /// The target window id was not found in the current state.
    #[error("window not found")]
    WindowNotFound,
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Applies a [`DesktopAction`] to the desktop runtime state and collects resulting side effects.
///
/// Window-count changes (open, close, minimize, restore) re-tile while in tiling mode.
///
/// # Errors
///
/// Returns [`ReducerError::WindowNotFound`] when an action references a missing window and
/// [`ReducerError::Layout`] when a template write is rejected.
pub fn reduce_desktop(
    state: &mut DesktopState,
    interaction: &mut InteractionState,
    action: DesktopAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let mut effects = Vec::new();
    match action {
        DesktopAction::OpenWindow(req) => {
            let window_id = open_window(state, req);
            effects.push(RuntimeEffect::FocusWindowContent(window_id));
        }
        DesktopAction::CloseWindow { window_id } => {
            let before_len = state.windows.len();
            state.windows.retain(|w| w.id != window_id);
            if state.windows.len() == before_len {
                return Err(ReducerError::WindowNotFound);
            }
            clear_sessions_for(interaction, window_id);
            normalize_window_stack(state);
            apply_tiling(state);
        }
        DesktopAction::FocusWindow { window_id } => {
            let was_minimized = find_window_mut(state, window_id)?.minimized;
            focus_window_internal(state, window_id);
            if was_minimized {
                apply_tiling(state);
            }
            effects.push(RuntimeEffect::FocusWindowContent(window_id));
        }
        DesktopAction::MinimizeWindow { window_id } => {
            let window = find_window_mut(state, window_id)?;
            window.minimized = true;
            window.is_focused = false;
            clear_sessions_for(interaction, window_id);
            normalize_window_stack(state);
            apply_tiling(state);
        }
        DesktopAction::MaximizeWindow { window_id } => {
            let viewport = state.viewport;
            let window = find_window_mut(state, window_id)?;
            if window.flags.maximizable {
                if !window.maximized {
                    window.restore_rect = Some(window.rect);
                }
                window.rect = viewport.clamped_min(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT);
                window.maximized = true;
                window.minimized = false;
            }
            focus_window_internal(state, window_id);
        }
        DesktopAction::RestoreWindow { window_id } => {
            let window = find_window_mut(state, window_id)?;
            let was_minimized = window.minimized;
            if window.maximized {
                if let Some(restore_rect) = window.restore_rect.take() {
                    window.rect = restore_rect;
                }
                window.maximized = false;
            }
            window.minimized = false;
            focus_window_internal(state, window_id);
            if was_minimized || state.mode == LayoutMode::Tiling {
                apply_tiling(state);
            }
        }
        DesktopAction::ToggleTaskbarWindow { window_id } => {
            let focused = state.focused_window_id() == Some(window_id);
            let minimized = find_window_mut(state, window_id)?.minimized;
            let next = if minimized {
                DesktopAction::RestoreWindow { window_id }
            } else if focused {
                DesktopAction::MinimizeWindow { window_id }
            } else {
                DesktopAction::FocusWindow { window_id }
            };
            effects.extend(reduce_desktop(state, interaction, next)?);
        }
        DesktopAction::ToggleLayoutMode => {
            state.mode = state.mode.toggled();
            *interaction = InteractionState::default();
            apply_tiling(state);
        }
        DesktopAction::ApplyTiling => {
            apply_tiling(state);
        }
        DesktopAction::SetViewport { viewport } => {
            state.viewport = WindowRect {
                w: viewport.w.max(0),
                h: viewport.h.max(0),
                ..viewport
            };
            apply_tiling(state);
        }
        DesktopAction::ApplyLayoutTemplate { template_id } => {
            let Some(template) = state.templates.find(&template_id) else {
                return Ok(effects);
            };
            let geometry = template.geometry();
            apply_geometry(state, &geometry);
            if geometry.tiles_viewport() {
                state.active_template = Some(template_id);
            } else {
                state.active_template = None;
                state.mode = LayoutMode::Floating;
            }
        }
        DesktopAction::SaveLayoutTemplate { template } => {
            let template_id = template.id.clone();
            state.templates.save(template)?;
            if state.active_template.as_deref() == Some(template_id.as_str()) {
                apply_tiling(state);
            }
            effects.push(RuntimeEffect::PersistLayoutTemplates);
        }
        DesktopAction::DeleteLayoutTemplate { template_id } => {
            state.templates.delete(&template_id)?;
            if state.active_template.as_deref() == Some(template_id.as_str()) {
                state.active_template = None;
                apply_tiling(state);
            }
            effects.push(RuntimeEffect::PersistLayoutTemplates);
        }
        DesktopAction::HydrateLayoutTemplates { templates } => {
            let saved_before_load = !state.templates.user_templates().is_empty();
            state.templates.merge_stored(templates);
            if saved_before_load {
                effects.push(RuntimeEffect::PersistLayoutTemplates);
            }
            let active_missing = state
                .active_template
                .as_deref()
                .is_some_and(|id| state.templates.find(id).is_none());
            if active_missing {
                state.active_template = None;
            }
        }
        DesktopAction::BeginMove { window_id, pointer } => {
            let window = find_window_mut(state, window_id)?;
            let rect_start = window.rect;
            let movable = !window.maximized;
            focus_window_internal(state, window_id);
            if state.mode == LayoutMode::Floating && movable {
                interaction.dragging = Some(DragSession {
                    window_id,
                    pointer_start: pointer,
                    rect_start,
                });
            }
        }
        DesktopAction::UpdateMove { pointer } => {
            if let Some(session) = interaction.dragging.as_ref() {
                let dx = pointer.x - session.pointer_start.x;
                let dy = pointer.y - session.pointer_start.y;
                let rect = session.rect_start.offset(dx, dy);
                let window = find_window_mut(state, session.window_id)?;
                if !window.maximized {
                    window.rect = rect;
                }
            }
        }
        DesktopAction::EndMove => {
            interaction.dragging = None;
        }
        DesktopAction::BeginResize {
            window_id,
            edge,
            pointer,
        } => {
            let window = find_window_mut(state, window_id)?;
            let rect_start = window.rect;
            let resizable = window.flags.resizable && !window.maximized;
            focus_window_internal(state, window_id);
            if state.mode == LayoutMode::Floating && resizable {
                interaction.resizing = Some(ResizeSession {
                    window_id,
                    edge,
                    pointer_start: pointer,
                    rect_start,
                });
            }
        }
        DesktopAction::UpdateResize { pointer } => {
            if let Some(session) = interaction.resizing.as_ref() {
                let dx = pointer.x - session.pointer_start.x;
                let dy = pointer.y - session.pointer_start.y;
                let rect = resize_rect(session.rect_start, session.edge, dx, dy)
                    .clamped_min(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT);
                let window = find_window_mut(state, session.window_id)?;
                if !window.maximized && window.flags.resizable {
                    window.rect = rect;
                }
            }
        }
        DesktopAction::EndResize => {
            interaction.resizing = None;
        }
        DesktopAction::SetWindowOpacity { opacity } => {
            state.preferences.window_opacity = DesktopPreferences::clamp_opacity(opacity);
            effects.push(RuntimeEffect::PersistPreferences);
        }
        DesktopAction::SetWallpaper { wallpaper } => {
            state.preferences.wallpaper = wallpaper;
            effects.push(RuntimeEffect::PersistPreferences);
        }
        DesktopAction::SetUseGradient { enabled } => {
            state.preferences.use_gradient = enabled;
            effects.push(RuntimeEffect::PersistPreferences);
        }
        DesktopAction::HydratePreferences { mut preferences } => {
            preferences.window_opacity =
                DesktopPreferences::clamp_opacity(preferences.window_opacity);
            state.preferences = preferences;
        }
    }

    normalize_window_stack(state);
    Ok(effects)
}

/// Pushes a new focused window on top of the stack and returns its id.
///
/// The window lands at the request's rect, a staggered default, or its tiling cell.
fn open_window(state: &mut DesktopState, req: OpenWindowRequest) -> WindowId {
    let window_id = next_window_id(state);
    let rect = match req.rect {
        Some(rect) => rect.clamped_min(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT),
        None => {
            let (w, h) = req
                .size
                .unwrap_or_else(|| desktop_config().default_window_size());
            staggered_rect(window_id, state.viewport, w, h)
        }
    };
    let record = WindowRecord {
        id: window_id,
        title: req.title,
        icon: req.icon.unwrap_or_else(|| DEFAULT_WINDOW_ICON.to_string()),
        content: req.content,
        rect,
        restore_rect: None,
        z_index: 0,
        is_focused: false,
        minimized: false,
        maximized: false,
        flags: req.flags,
    };
    state.windows.push(record);
    focus_window_internal(state, window_id);
    apply_tiling(state);
    state.last_opened = Some(window_id);
    window_id
}

fn next_window_id(state: &mut DesktopState) -> WindowId {
    let id = WindowId(state.next_window_id);
    state.next_window_id = state.next_window_id.saturating_add(1);
    id
}

fn find_window_mut(
    state: &mut DesktopState,
    window_id: WindowId,
) -> Result<&mut WindowRecord, ReducerError> {
    state
        .windows
        .iter_mut()
        .find(|w| w.id == window_id)
        .ok_or(ReducerError::WindowNotFound)
}

fn clear_sessions_for(interaction: &mut InteractionState, window_id: WindowId) {
    if interaction
        .dragging
        .as_ref()
        .is_some_and(|s| s.window_id == window_id)
    {
        interaction.dragging = None;
    }
    if interaction
        .resizing
        .as_ref()
        .is_some_and(|s| s.window_id == window_id)
    {
        interaction.resizing = None;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn open(state: &mut DesktopState, interaction: &mut InteractionState, title: &str) -> WindowId {
        let _ = reduce_desktop(
            state,
            interaction,
            DesktopAction::OpenWindow(OpenWindowRequest::html(title, "<p>hi</p>")),
        )
        .expect("open window");
        state.last_opened.expect("window id")
    }

    fn dispatch(
        state: &mut DesktopState,
        interaction: &mut InteractionState,
        action: DesktopAction,
    ) -> Vec<RuntimeEffect> {
        reduce_desktop(state, interaction, action).expect("action applies")
    }

    fn assert_stack_invariants(state: &DesktopState) {
        let z: Vec<u32> = state.windows.iter().map(|w| w.z_index).collect();
        let expected: Vec<u32> = (1..=state.windows.len() as u32).collect();
        assert_eq!(z, expected);
        assert!(state.windows.iter().filter(|w| w.is_focused).count() <= 1);
    }

    #[test]
    fn open_window_focuses_new_window_and_updates_stack() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();

        let first = open(&mut state, &mut interaction, "Files");
        let second = open(&mut state, &mut interaction, "Shares");

        assert_eq!(state.focused_window_id(), Some(second));
        assert_eq!(state.windows[0].id, first);
        assert_eq!(state.windows[1].z_index, 2);
        assert_ne!(first, second);
    }

    #[test]
    fn unsized_windows_take_the_configured_default_size() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, "Files");
        let rect = state.window(id).expect("window").rect;
        assert_eq!((rect.w, rect.h), desktop_config().default_window_size());
    }

    #[test]
    fn window_count_tracks_opens_minus_closes() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let ids: Vec<WindowId> = (0..5)
            .map(|i| open(&mut state, &mut interaction, &format!("W{i}")))
            .collect();
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::CloseWindow { window_id: ids[1] },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::CloseWindow { window_id: ids[4] },
        );

        assert_eq!(state.windows.len(), 3);
        assert_stack_invariants(&state);
        assert_eq!(state.focused_window_id(), Some(ids[3]));
        let reopened = open(&mut state, &mut interaction, "Again");
        assert_eq!(reopened, WindowId(6));
    }

    #[test]
    fn closing_unknown_window_is_an_error() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        assert_eq!(
            reduce_desktop(
                &mut state,
                &mut interaction,
                DesktopAction::CloseWindow {
                    window_id: WindowId(7)
                },
            ),
            Err(ReducerError::WindowNotFound)
        );
    }

    #[test]
    fn focus_keeps_z_order_strict_and_emits_content_focus() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let first = open(&mut state, &mut interaction, "A");
        open(&mut state, &mut interaction, "B");

        let effects = dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::FocusWindow { window_id: first },
        );
        assert_eq!(state.windows.last().map(|w| w.id), Some(first));
        assert_stack_invariants(&state);
        assert!(effects.contains(&RuntimeEffect::FocusWindowContent(first)));
    }

    #[test]
    fn toggle_mode_twice_is_identity() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let before = state.mode;
        dispatch(&mut state, &mut interaction, DesktopAction::ToggleLayoutMode);
        assert_eq!(state.mode, LayoutMode::Tiling);
        dispatch(&mut state, &mut interaction, DesktopAction::ToggleLayoutMode);
        assert_eq!(state.mode, before);
    }

    #[test]
    fn four_windows_with_grid_template_fill_quadrants() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        for title in ["A", "B", "C", "D"] {
            open(&mut state, &mut interaction, title);
        }
        dispatch(&mut state, &mut interaction, DesktopAction::ToggleLayoutMode);
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::ApplyLayoutTemplate {
                template_id: "grid-2x2".to_string(),
            },
        );

        assert_eq!(state.mode, LayoutMode::Tiling);
        let mut rects: Vec<WindowRect> = state.windows.iter().map(|w| w.rect).collect();
        rects.sort_by_key(|r| (r.y, r.x));
        assert_eq!(
            rects,
            vec![
                WindowRect::new(0, 0, 640, 360),
                WindowRect::new(640, 0, 640, 360),
                WindowRect::new(0, 360, 640, 360),
                WindowRect::new(640, 360, 640, 360),
            ]
        );
    }

    #[test]
    fn opening_while_tiling_retiles_every_window() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        dispatch(&mut state, &mut interaction, DesktopAction::ToggleLayoutMode);
        let first = open(&mut state, &mut interaction, "A");
        assert_eq!(state.window(first).map(|w| w.rect), Some(state.viewport));

        let second = open(&mut state, &mut interaction, "B");
        assert_eq!(
            state.window(first).map(|w| w.rect),
            Some(WindowRect::new(0, 0, 640, 720))
        );
        assert_eq!(
            state.window(second).map(|w| w.rect),
            Some(WindowRect::new(640, 0, 640, 720))
        );
    }

    #[test]
    fn minimizing_while_tiling_gives_space_back() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        dispatch(&mut state, &mut interaction, DesktopAction::ToggleLayoutMode);
        let first = open(&mut state, &mut interaction, "A");
        let second = open(&mut state, &mut interaction, "B");
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::MinimizeWindow { window_id: second },
        );
        assert_eq!(state.window(first).map(|w| w.rect), Some(state.viewport));
        assert_eq!(state.focused_window_id(), Some(first));
    }

    #[test]
    fn viewport_change_retiles() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        dispatch(&mut state, &mut interaction, DesktopAction::ToggleLayoutMode);
        let only = open(&mut state, &mut interaction, "A");
        let viewport = WindowRect::new(0, 0, 800, 560);
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::SetViewport { viewport },
        );
        assert_eq!(state.window(only).map(|w| w.rect), Some(viewport));
    }

    #[test]
    fn drag_is_ignored_while_tiling() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        dispatch(&mut state, &mut interaction, DesktopAction::ToggleLayoutMode);
        let win = open(&mut state, &mut interaction, "A");
        let before = state.window(win).map(|w| w.rect);

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::BeginMove {
                window_id: win,
                pointer: PointerPosition { x: 10, y: 10 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::UpdateMove {
                pointer: PointerPosition { x: 90, y: 90 },
            },
        );
        assert!(interaction.dragging.is_none());
        assert_eq!(state.window(win).map(|w| w.rect), before);
    }

    #[test]
    fn moving_window_updates_rect_during_drag() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let win = open(&mut state, &mut interaction, "A");
        let original = state.window(win).expect("window").rect;

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::BeginMove {
                window_id: win,
                pointer: PointerPosition { x: 10, y: 10 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::UpdateMove {
                pointer: PointerPosition { x: 35, y: 50 },
            },
        );
        dispatch(&mut state, &mut interaction, DesktopAction::EndMove);

        let moved = state.window(win).expect("window").rect;
        assert_eq!(moved, original.offset(25, 40));
        assert!(!interaction.is_active());
    }

    #[test]
    fn resize_respects_minimum_size() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let win = open(&mut state, &mut interaction, "A");
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::BeginResize {
                window_id: win,
                edge: ResizeEdge::SouthEast,
                pointer: PointerPosition { x: 0, y: 0 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::UpdateResize {
                pointer: PointerPosition { x: -2000, y: -2000 },
            },
        );
        let rect = state.window(win).expect("window").rect;
        assert_eq!((rect.w, rect.h), (MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT));
    }

    #[test]
    fn maximize_then_restore_returns_previous_rect() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let win = open(&mut state, &mut interaction, "A");
        let original = state.window(win).expect("window").rect;

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::MaximizeWindow { window_id: win },
        );
        assert_eq!(state.window(win).map(|w| w.rect), Some(state.viewport));
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::RestoreWindow { window_id: win },
        );
        let record = state.window(win).expect("window");
        assert_eq!(record.rect, original);
        assert!(!record.maximized);
    }

    #[test]
    fn taskbar_toggle_minimizes_if_focused_and_restores_if_minimized() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let win = open(&mut state, &mut interaction, "A");

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::ToggleTaskbarWindow { window_id: win },
        );
        assert!(state.window(win).expect("window").minimized);
        assert_eq!(state.focused_window_id(), None);

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::ToggleTaskbarWindow { window_id: win },
        );
        let record = state.window(win).expect("window");
        assert!(!record.minimized);
        assert!(record.is_focused);
    }

    #[test]
    fn unknown_template_is_a_no_op() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        open(&mut state, &mut interaction, "A");
        let before = state.clone();
        let effects = dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::ApplyLayoutTemplate {
                template_id: "nope".to_string(),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn overlapping_template_switches_back_to_floating() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        open(&mut state, &mut interaction, "A");
        open(&mut state, &mut interaction, "B");
        dispatch(&mut state, &mut interaction, DesktopAction::ToggleLayoutMode);
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::ApplyLayoutTemplate {
                template_id: "cascade".to_string(),
            },
        );
        assert_eq!(state.mode, LayoutMode::Floating);
        assert_eq!(state.active_template, None);
        assert_eq!(state.windows[1].rect.x, state.windows[0].rect.x + 30);
    }

    #[test]
    fn saving_templates_persists_and_builtins_are_protected() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let effects = dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::SaveLayoutTemplate {
                template: LayoutTemplate::new(
                    "focus",
                    "Focus",
                    "vertical",
                    json!({ "ratio": 0.7 }),
                ),
            },
        );
        assert_eq!(effects, vec![RuntimeEffect::PersistLayoutTemplates]);

        let err = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::DeleteLayoutTemplate {
                template_id: "grid-2x2".to_string(),
            },
        );
        assert_eq!(
            err,
            Err(ReducerError::Layout(LayoutError::BuiltinImmutable(
                "grid-2x2".to_string()
            )))
        );
    }

    #[test]
    fn late_template_hydration_keeps_templates_saved_meanwhile() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::SaveLayoutTemplate {
                template: LayoutTemplate::new("focus", "Focus", "vertical", json!({})),
            },
        );

        let effects = dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::HydrateLayoutTemplates {
                templates: vec![LayoutTemplate::new("quad", "Quad", "grid", json!({}))],
            },
        );

        let ids: Vec<&str> = state
            .templates
            .user_templates()
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["quad", "focus"]);
        assert_eq!(effects, vec![RuntimeEffect::PersistLayoutTemplates]);
    }

    #[test]
    fn deleting_active_template_falls_back_to_auto_tiling() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::SaveLayoutTemplate {
                template: LayoutTemplate::new(
                    "wide",
                    "Wide",
                    "vertical",
                    json!({ "ratio": 0.75 }),
                ),
            },
        );
        dispatch(&mut state, &mut interaction, DesktopAction::ToggleLayoutMode);
        let first = open(&mut state, &mut interaction, "A");
        open(&mut state, &mut interaction, "B");
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::ApplyLayoutTemplate {
                template_id: "wide".to_string(),
            },
        );
        assert_eq!(state.window(first).map(|w| w.rect.w), Some(960));

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::DeleteLayoutTemplate {
                template_id: "wide".to_string(),
            },
        );
        assert_eq!(state.active_template, None);
        assert_eq!(state.window(first).map(|w| w.rect.w), Some(640));
    }

    #[test]
    fn preferences_are_clamped_and_persisted() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let effects = dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::SetWindowOpacity { opacity: 0.05 },
        );
        assert_eq!(state.preferences.window_opacity, 0.3);
        assert_eq!(effects, vec![RuntimeEffect::PersistPreferences]);

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::HydratePreferences {
                preferences: DesktopPreferences {
                    window_opacity: 4.0,
                    wallpaper: "dunes".to_string(),
                    use_gradient: false,
                },
            },
        );
        assert_eq!(state.preferences.window_opacity, 1.0);
        assert_eq!(state.preferences.wallpaper, "dunes");
    }
}
