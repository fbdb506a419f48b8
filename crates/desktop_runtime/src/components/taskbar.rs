use super::*;
use crate::model::{DesktopState, LayoutMode, WindowRecord};

/// Taskbar buttons stay in creation order while focus changes the stack.
fn ordered_taskbar_windows(state: &DesktopState) -> Vec<WindowRecord> {
    let mut windows = state.windows.clone();
    windows.sort_by_key(|win| win.id);
    windows
}

fn taskbar_window_aria_label(win: &WindowRecord) -> String {
    let status = if win.minimized {
        "minimized"
    } else if win.is_focused {
        "active"
    } else {
        "open"
    };
    format!("{} ({status})", win.title)
}

fn mode_toggle_label(mode: LayoutMode) -> String {
    format!("Layout: {}", mode.label())
}

#[component]
pub(super) fn Taskbar() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    let height = desktop_config().taskbar_height;

    view! {
        <footer class="taskbar" role="toolbar" style=format!("height:{height}px;")>
            <button
                class="taskbar-launcher-button"
                aria-label="Open launcher"
                on:click=move |ev| {
                    stop_mouse_event(&ev);
                    runtime.open_launcher();
                }
            >
                "Apps"
            </button>

            <div class="taskbar-windows">
                <For
                    each=move || ordered_taskbar_windows(&state.get())
                    key=|win| (win.id.0, win.is_focused, win.minimized, win.title.clone())
                    let:win
                >
                    {{
                        let window_id = win.id;
                        let class_name = format!(
                            "taskbar-window{}{}",
                            if win.is_focused && !win.minimized { " active" } else { "" },
                            if win.minimized { " minimized" } else { "" },
                        );
                        view! {
                            <button
                                class=class_name
                                aria-label=taskbar_window_aria_label(&win)
                                on:click=move |_| {
                                    runtime
                                        .dispatch_action(DesktopAction::ToggleTaskbarWindow {
                                            window_id,
                                        });
                                }
                            >
                                {win.title.clone()}
                            </button>
                        }
                    }}
                </For>
            </div>

            <div class="taskbar-layout">
                <select
                    aria-label="Apply layout template"
                    on:change=move |ev| {
                        let template_id = event_target_value(&ev);
                        if !template_id.is_empty() {
                            runtime
                                .dispatch_action(DesktopAction::ApplyLayoutTemplate {
                                    template_id,
                                });
                        }
                    }
                    prop:value=move || state.get().active_template.unwrap_or_default()
                >
                    <option value="">"Layout…"</option>
                    <For
                        each=move || state.get().templates.templates()
                        key=|template| (template.id.clone(), template.name.clone())
                        let:template
                    >
                        <option value=template.id.clone()>{template.name.clone()}</option>
                    </For>
                </select>
                <button
                    class="taskbar-mode-toggle"
                    aria-pressed=move || (state.get().mode == LayoutMode::Tiling).to_string()
                    on:click=move |_| runtime.dispatch_action(DesktopAction::ToggleLayoutMode)
                >
                    {move || mode_toggle_label(state.get().mode)}
                </button>
            </div>
        </footer>
    }
}
