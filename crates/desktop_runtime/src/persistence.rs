//! Client-side persistence for display preferences and user layout templates.
//!
//! Preferences live under flat keys so other tools reading the same origin's `localStorage` see
//! plain values: `windowOpacity` as a number, `wallpaper` as a bare string, `useGradient` as a
//! boolean. User layout templates are one JSON array.

use platform_host::{load_pref_with, save_pref_with, PrefsStore};

use crate::layout::{LayoutTemplate, LayoutTemplateStore};
use crate::model::DesktopPreferences;

pub const WINDOW_OPACITY_KEY: &str = "windowOpacity";
pub const WALLPAPER_KEY: &str = "wallpaper";
pub const USE_GRADIENT_KEY: &str = "useGradient";
pub const LAYOUT_TEMPLATES_KEY: &str = "desktop.layoutTemplates.v1";

fn warn_malformed<T>(result: Result<Option<T>, String>) -> Option<T> {
    result.unwrap_or_else(|err| {
        leptos::logging::warn!("ignoring stored preference: {err}");
        None
    })
}

async fn load_wallpaper<S: PrefsStore + ?Sized>(store: &S) -> Result<Option<String>, String> {
    let Some(raw) = store.load_pref(WALLPAPER_KEY).await? else {
        return Ok(None);
    };
    // Older writers stored the id JSON-quoted.
    let id = serde_json::from_str::<String>(&raw).unwrap_or(raw);
    Ok(Some(id).filter(|id| !id.trim().is_empty()))
}

/// Loads stored display preferences over the defaults.
///
/// Returns `None` when no preference key is stored. Malformed values are logged and skipped.
pub async fn load_preferences<S: PrefsStore + ?Sized>(store: &S) -> Option<DesktopPreferences> {
    let opacity = warn_malformed(load_pref_with::<_, f64>(store, WINDOW_OPACITY_KEY).await);
    let wallpaper = warn_malformed(load_wallpaper(store).await);
    let use_gradient = warn_malformed(load_pref_with::<_, bool>(store, USE_GRADIENT_KEY).await);

    if opacity.is_none() && wallpaper.is_none() && use_gradient.is_none() {
        return None;
    }
    let defaults = DesktopPreferences::default();
    Some(DesktopPreferences {
        window_opacity: DesktopPreferences::clamp_opacity(
            opacity.unwrap_or(defaults.window_opacity),
        ),
        wallpaper: wallpaper.unwrap_or(defaults.wallpaper),
        use_gradient: use_gradient.unwrap_or(defaults.use_gradient),
    })
}

/// Writes all three preference keys.
///
/// # Errors
///
/// Returns the first store failure.
pub async fn persist_preferences<S: PrefsStore + ?Sized>(
    store: &S,
    preferences: &DesktopPreferences,
) -> Result<(), String> {
    save_pref_with(store, WINDOW_OPACITY_KEY, &preferences.window_opacity).await?;
    store
        .save_pref(WALLPAPER_KEY, &preferences.wallpaper)
        .await?;
    save_pref_with(store, USE_GRADIENT_KEY, &preferences.use_gradient).await
}

pub async fn load_layout_templates<S: PrefsStore + ?Sized>(
    store: &S,
) -> Option<Vec<LayoutTemplate>> {
    warn_malformed(load_pref_with::<_, Vec<LayoutTemplate>>(store, LAYOUT_TEMPLATES_KEY).await)
}

/// Writes the user templates (built-ins are never stored).
///
/// # Errors
///
/// Returns the store failure.
pub async fn persist_layout_templates<S: PrefsStore + ?Sized>(
    store: &S,
    templates: &LayoutTemplateStore,
) -> Result<(), String> {
    save_pref_with(store, LAYOUT_TEMPLATES_KEY, templates.user_templates()).await
}
