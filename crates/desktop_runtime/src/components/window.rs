use super::*;
use crate::{
    apps::window_panel_kind,
    config::{panel_manifest, PanelKind},
    host::window_content_dom_id,
    model::{ResizeEdge, WindowContent, WindowId},
};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

use super::{
    display_properties::DisplaySettingsPanel,
    layout_tools::LayoutToolsPanel,
    panels::{ResourcePanel, WifiPanel},
};

#[cfg(target_arch = "wasm32")]
fn try_set_pointer_capture(ev: &web_sys::PointerEvent) {
    if let Some(target) = ev.current_target() {
        if let Ok(element) = target.dyn_into::<web_sys::Element>() {
            let _ = element.set_pointer_capture(ev.pointer_id());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn try_set_pointer_capture(_: &web_sys::PointerEvent) {}

fn is_primary_press(ev: &web_sys::PointerEvent) -> bool {
    if ev.pointer_type() == "mouse" {
        ev.button() == 0
    } else {
        ev.is_primary()
    }
}

#[component]
pub(super) fn DesktopWindow(window_id: WindowId) -> impl IntoView {
    let runtime = use_desktop_runtime();

    let window = Signal::derive(move || {
        runtime
            .state
            .get()
            .windows
            .into_iter()
            .find(|w| w.id == window_id)
    });
    let opacity = Signal::derive(move || runtime.state.get().preferences.window_opacity);

    let focus = move |_| {
        let should_focus = window.get().is_some_and(|w| !w.is_focused || w.minimized);
        if should_focus {
            runtime.dispatch_action(DesktopAction::FocusWindow { window_id });
        }
    };
    let minimize = move |_| runtime.dispatch_action(DesktopAction::MinimizeWindow { window_id });
    let close = move |_| runtime.dispatch_action(DesktopAction::CloseWindow { window_id });
    let toggle_maximize = move || {
        if let Some(win) = window.get_untracked() {
            if win.maximized {
                runtime.dispatch_action(DesktopAction::RestoreWindow { window_id });
            } else if win.flags.maximizable {
                runtime.dispatch_action(DesktopAction::MaximizeWindow { window_id });
            }
        }
    };
    let begin_move = move |ev: web_sys::PointerEvent| {
        if !is_primary_press(&ev) {
            return;
        }
        try_set_pointer_capture(&ev);
        ev.prevent_default();
        ev.stop_propagation();
        runtime.dispatch_action(DesktopAction::FocusWindow { window_id });
        runtime.dispatch_action(DesktopAction::BeginMove {
            window_id,
            pointer: pointer_from_pointer_event(&ev),
        });
    };

    // The body mounts once; only frame attributes track state.
    let Some(initial) = window.get_untracked() else {
        return ().into_view();
    };
    let minimizable = initial.flags.minimizable;
    let maximizable = initial.flags.maximizable;
    let resizable = initial.flags.resizable;
    let is_maximized = move || window.get().is_some_and(|w| w.maximized);

    view! {
        <section
            class=move || {
                window
                    .get()
                    .map(|win| {
                        format!(
                            "desktop-window{}{}{}",
                            if win.is_focused { " focused" } else { "" },
                            if win.minimized { " minimized" } else { "" },
                            if win.maximized { " maximized" } else { "" },
                        )
                    })
                    .unwrap_or_default()
            }
            style=move || {
                window
                    .get()
                    .map(|win| {
                        format!(
                            "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{};opacity:{};",
                            win.rect.x,
                            win.rect.y,
                            win.rect.w,
                            win.rect.h,
                            win.z_index,
                            opacity.get(),
                        )
                    })
                    .unwrap_or_default()
            }
            on:pointerdown=focus
            role="dialog"
            aria-label=move || window.get().map(|w| w.title).unwrap_or_default()
        >
            <header
                class="titlebar"
                on:pointerdown=begin_move
                on:dblclick=move |ev| {
                    stop_mouse_event(&ev);
                    toggle_maximize();
                }
            >
                <div class="titlebar-title">
                    <span
                        class="titlebar-app-icon"
                        data-icon=initial.icon.clone()
                        aria-hidden="true"
                    ></span>
                    <span>{move || window.get().map(|w| w.title).unwrap_or_default()}</span>
                </div>
                <div class="titlebar-controls">
                    <button
                        disabled=!minimizable
                        aria-label="Minimize window"
                        on:pointerdown=move |ev: web_sys::PointerEvent| ev.stop_propagation()
                        on:click=move |ev| {
                            stop_mouse_event(&ev);
                            minimize(ev);
                        }
                    >
                        "_"
                    </button>
                    <button
                        disabled=!maximizable
                        aria-label=move || {
                            if is_maximized() { "Restore window" } else { "Maximize window" }
                        }
                        on:pointerdown=move |ev: web_sys::PointerEvent| ev.stop_propagation()
                        on:click=move |ev| {
                            stop_mouse_event(&ev);
                            toggle_maximize();
                        }
                    >
                        {move || if is_maximized() { "❐" } else { "□" }}
                    </button>
                    <button
                        aria-label="Close window"
                        on:pointerdown=move |ev: web_sys::PointerEvent| ev.stop_propagation()
                        on:click=move |ev| {
                            stop_mouse_event(&ev);
                            close(ev);
                        }
                    >
                        "×"
                    </button>
                </div>
            </header>
            <div
                class="window-body"
                id=window_content_dom_id(window_id)
                tabindex="-1"
            >
                <WindowBody content=initial.content.clone() />
            </div>
            <Show when=move || resizable && !is_maximized() fallback=|| ()>
                {ResizeEdge::ALL
                    .into_iter()
                    .map(|edge| view! { <WindowResizeHandle window_id edge /> })
                    .collect_view()}
            </Show>
        </section>
    }
    .into_view()
}

#[component]
fn WindowResizeHandle(window_id: WindowId, edge: ResizeEdge) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let class_name = format!("window-resize-handle {}", edge.css_class());

    let on_pointerdown = move |ev: web_sys::PointerEvent| {
        if !is_primary_press(&ev) {
            return;
        }
        try_set_pointer_capture(&ev);
        ev.prevent_default();
        ev.stop_propagation();
        runtime.dispatch_action(DesktopAction::BeginResize {
            window_id,
            edge,
            pointer: pointer_from_pointer_event(&ev),
        });
    };

    view! {
        <div
            class=class_name
            aria-hidden="true"
            on:pointerdown=on_pointerdown
        />
    }
}

#[component]
fn WindowBody(content: WindowContent) -> impl IntoView {
    let panel = window_panel_kind(&content);
    match content {
        WindowContent::App { app_id } => {
            let (Some(kind), Some(manifest)) = (panel, panel_manifest(&app_id)) else {
                return view! { <p class="window-placeholder">"Unknown app"</p> }.into_view();
            };
            match kind {
                PanelKind::Resource => view! { <ResourcePanel manifest /> }.into_view(),
                PanelKind::Wifi => view! { <WifiPanel manifest /> }.into_view(),
                PanelKind::DisplaySettings => view! { <DisplaySettingsPanel /> }.into_view(),
                PanelKind::LayoutTools => view! { <LayoutToolsPanel /> }.into_view(),
            }
        }
        WindowContent::Html { html } => {
            view! { <div class="window-body-content" inner_html=html></div> }.into_view()
        }
        WindowContent::Placeholder { message } => {
            view! { <p class="window-placeholder">{message}</p> }.into_view()
        }
    }
}
