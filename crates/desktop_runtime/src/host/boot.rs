use leptos::{create_effect, logging, spawn_local, Callable, Callback};

use crate::{host::DesktopHostContext, persistence, reducer::DesktopAction};

pub(super) fn install_boot_hydration(host: DesktopHostContext, dispatch: Callback<DesktopAction>) {
    create_effect(move |_| {
        let dispatch = dispatch;
        let prefs = host.prefs_store();
        spawn_local(async move {
            if let Some(preferences) = persistence::load_preferences(prefs.as_ref()).await {
                dispatch.call(DesktopAction::HydratePreferences { preferences });
            }

            if let Some(templates) = persistence::load_layout_templates(prefs.as_ref()).await {
                logging::log!("restoring {} user layout templates", templates.len());
                dispatch.call(DesktopAction::HydrateLayoutTemplates { templates });
            }
        });
    });
}
