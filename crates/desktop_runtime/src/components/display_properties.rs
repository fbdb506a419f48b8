use super::*;
use crate::model::MIN_WINDOW_OPACITY;

/// Slider position (percent) for an opacity value.
fn opacity_percent(opacity: f64) -> i32 {
    (opacity * 100.0).round() as i32
}

fn opacity_from_input(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().map(|percent| percent / 100.0)
}

#[component]
pub(super) fn DisplaySettingsPanel() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    let preferences = Signal::derive(move || state.get().preferences);
    let min_percent = opacity_percent(MIN_WINDOW_OPACITY);

    view! {
        <div class="display-settings">
            <label class="display-settings-row">
                <span>"Window opacity"</span>
                <input
                    type="range"
                    min=min_percent
                    max="100"
                    step="1"
                    prop:value=move || opacity_percent(preferences.get().window_opacity).to_string()
                    on:input=move |ev| {
                        if let Some(opacity) = opacity_from_input(&event_target_value(&ev)) {
                            runtime.dispatch_action(DesktopAction::SetWindowOpacity { opacity });
                        }
                    }
                />
                <output>{move || format!("{}%", opacity_percent(preferences.get().window_opacity))}</output>
            </label>

            <label class="display-settings-row">
                <span>"Wallpaper"</span>
                <select
                    prop:value=move || preferences.get().wallpaper
                    on:change=move |ev| {
                        runtime
                            .dispatch_action(DesktopAction::SetWallpaper {
                                wallpaper: event_target_value(&ev),
                            });
                    }
                >
                    {desktop_config()
                        .wallpapers
                        .iter()
                        .map(|preset| {
                            view! { <option value=preset.id.clone()>{preset.label.clone()}</option> }
                        })
                        .collect_view()}
                </select>
            </label>

            <label class="display-settings-row">
                <input
                    type="checkbox"
                    prop:checked=move || preferences.get().use_gradient
                    on:change=move |ev| {
                        runtime
                            .dispatch_action(DesktopAction::SetUseGradient {
                                enabled: event_target_checked(&ev),
                            });
                    }
                />
                <span>"Gradient background"</span>
            </label>
        </div>
    }
}
