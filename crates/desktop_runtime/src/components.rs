//! Desktop shell UI composition and interaction surfaces.

mod display_properties;
mod launcher;
mod layout_tools;
mod panels;
mod taskbar;
mod window;

use leptos::*;

use self::{launcher::LauncherOverlay, taskbar::Taskbar, window::DesktopWindow};

use crate::{
    config::desktop_config,
    launcher::is_launcher_hotkey,
    model::{DesktopPreferences, PointerPosition},
    reducer::DesktopAction,
};

pub use crate::runtime_context::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext};

fn stop_mouse_event(ev: &web_sys::MouseEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> PointerPosition {
    PointerPosition {
        x: ev.client_x(),
        y: ev.client_y(),
    }
}

fn end_active_pointer_interaction(runtime: DesktopRuntimeContext) {
    let interaction = runtime.interaction.get_untracked();
    if interaction.dragging.is_some() {
        runtime.dispatch_action(DesktopAction::EndMove);
    }
    if interaction.resizing.is_some() {
        runtime.dispatch_action(DesktopAction::EndResize);
    }
}

/// CSS background for the configured wallpaper preset.
fn wallpaper_style(preferences: &DesktopPreferences) -> String {
    let Some(preset) = desktop_config().wallpaper(&preferences.wallpaper) else {
        return "background:#1d232f;".to_string();
    };
    if preferences.use_gradient {
        format!(
            "background:linear-gradient(135deg, {} 0%, {} 100%);",
            preset.primary, preset.secondary
        )
    } else {
        format!("background:{};", preset.primary)
    }
}

#[component]
/// Renders the full desktop shell UI and processes queued [`crate::RuntimeEffect`] values.
pub fn DesktopShell() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    let taskbar_height = desktop_config().taskbar_height;

    let resize_listener = window_event_listener(ev::resize, move |_| {
        runtime.dispatch_action(DesktopAction::SetViewport {
            viewport: runtime.viewport(),
        });
    });
    on_cleanup(move || resize_listener.remove());

    let hotkey_listener = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() {
            return;
        }
        if is_launcher_hotkey(&ev.key(), &ev.code(), ev.alt_key(), ev.meta_key()) {
            ev.prevent_default();
            runtime.open_launcher();
        }
    });
    on_cleanup(move || hotkey_listener.remove());

    let on_pointer_move = move |ev: web_sys::PointerEvent| {
        let pointer = pointer_from_pointer_event(&ev);
        let interaction = runtime.interaction.get_untracked();

        if interaction.dragging.is_some() {
            runtime.dispatch_action(DesktopAction::UpdateMove { pointer });
        }
        if interaction.resizing.is_some() {
            runtime.dispatch_action(DesktopAction::UpdateResize { pointer });
        }
    };
    let on_pointer_end = move |_| end_active_pointer_interaction(runtime);

    view! {
        <div
            id="desktop-shell-root"
            class="desktop-shell"
            tabindex="-1"
            data-layout-mode=move || state.get().mode.as_str()
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_end
            on:pointercancel=on_pointer_end
        >
            <div
                class="desktop-backdrop"
                style=move || {
                    format!(
                        "{}bottom:{}px;",
                        wallpaper_style(&state.get().preferences),
                        taskbar_height,
                    )
                }
            >
                <For
                    each=move || state.get().windows
                    key=|win| win.id.0
                    let:win
                >
                    <DesktopWindow window_id=win.id />
                </For>
            </div>

            <LauncherOverlay />
            <Taskbar />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn wallpaper_style_follows_gradient_toggle() {
        let mut preferences = DesktopPreferences::default();
        let preset = desktop_config()
            .wallpaper(&preferences.wallpaper)
            .expect("default wallpaper preset");

        assert!(wallpaper_style(&preferences).contains("linear-gradient"));
        preferences.use_gradient = false;
        assert_eq!(
            wallpaper_style(&preferences),
            format!("background:{};", preset.primary)
        );
    }

    #[test]
    fn unknown_wallpaper_uses_a_flat_fallback() {
        let preferences = DesktopPreferences {
            wallpaper: "missing".to_string(),
            ..DesktopPreferences::default()
        };
        assert_eq!(wallpaper_style(&preferences), "background:#1d232f;");
    }
}
