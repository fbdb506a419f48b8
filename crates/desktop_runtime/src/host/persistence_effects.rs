use leptos::{logging, spawn_local, SignalGetUntracked};

use crate::{host::DesktopHostContext, persistence, runtime_context::DesktopRuntimeContext};

pub(super) fn persist_preferences(host: DesktopHostContext, runtime: DesktopRuntimeContext) {
    let preferences = runtime.state.get_untracked().preferences;
    spawn_local(async move {
        let prefs = host.prefs_store();
        if let Err(err) = persistence::persist_preferences(prefs.as_ref(), &preferences).await {
            logging::warn!("persist preferences failed: {err}");
        }
    });
}

pub(super) fn persist_layout_templates(host: DesktopHostContext, runtime: DesktopRuntimeContext) {
    let templates = runtime.state.get_untracked().templates;
    spawn_local(async move {
        let prefs = host.prefs_store();
        if let Err(err) = persistence::persist_layout_templates(prefs.as_ref(), &templates).await {
            logging::warn!("persist layout templates failed: {err}");
        }
    });
}
