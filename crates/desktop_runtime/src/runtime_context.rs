//! Runtime provider and context wiring for the desktop shell.
//!
//! This module owns the long-lived reducer container, the runtime effect queue, launcher state,
//! and host bootstrap wiring. UI composition stays in [`crate::components`].
#![allow(clippy::clone_on_copy)]

use leptos::*;
use platform_host::{ApiError, HostServices};

use crate::{
    apps::app_registry,
    config::desktop_config,
    effect_executor,
    host::DesktopHostContext,
    launcher::{AppEntry, Launcher},
    model::{DesktopState, InteractionState, WindowRect},
    packages,
    reducer::{reduce_desktop, DesktopAction, RuntimeEffect},
};

#[derive(Clone, Copy)]
/// Leptos context for reading desktop runtime state and dispatching [`DesktopAction`] values.
pub struct DesktopRuntimeContext {
    /// Host service bundle for executing runtime side effects and environment queries.
    pub host: StoredValue<DesktopHostContext>,
    /// Reactive desktop state signal.
    pub state: RwSignal<DesktopState>,
    /// Reactive pointer/drag/resize interaction state signal.
    pub interaction: RwSignal<InteractionState>,
    /// Queue of runtime effects emitted by the reducer and processed by the shell.
    pub effects: RwSignal<Vec<RuntimeEffect>>,
    /// Launcher overlay state and package lists.
    pub launcher: RwSignal<Launcher>,
    /// Reducer dispatch callback.
    pub dispatch: Callback<DesktopAction>,
}

impl DesktopRuntimeContext {
    /// Dispatches a reducer action through the runtime context callback.
    pub fn dispatch_action(&self, action: DesktopAction) {
        self.dispatch.call(action);
    }

    /// Current viewport, excluding the taskbar.
    pub fn viewport(&self) -> WindowRect {
        self.host
            .get_value()
            .desktop_viewport_rect(desktop_config().taskbar_height)
    }

    /// Launches an app, focusing its window when one is already open.
    pub fn launch(&self, entry: &AppEntry) {
        let action = app_registry().launch_action(&self.state.get_untracked(), entry);
        self.dispatch_action(action);
    }

    /// Opens the launcher overlay and refetches the installed package list.
    pub fn open_launcher(&self) {
        self.launcher.update(Launcher::open);
        self.refresh_installed();
    }

    pub fn refresh_installed(&self) {
        let launcher = self.launcher;
        let Some(ticket) = launcher.try_update(Launcher::begin_installed_refresh) else {
            return;
        };
        let api = self.host.get_value().backend_api();
        spawn_local(async move {
            let abort = ticket.abort_handle().clone();
            let result = packages::fetch_installed(api.as_ref(), Some(&abort)).await;
            if matches!(result, Err(ApiError::Aborted)) {
                return;
            }
            launcher.try_update(|l| l.finish_installed_refresh(ticket, result));
        });
    }

    /// Searches the available tab for `query`, aborting the search it supersedes.
    pub fn search_available(&self, query: String) {
        let launcher = self.launcher;
        let Some(ticket) = launcher.try_update(Launcher::begin_available_search) else {
            return;
        };
        let api = self.host.get_value().backend_api();
        spawn_local(async move {
            let abort = ticket.abort_handle().clone();
            let result = packages::search_available(api.as_ref(), &query, Some(&abort)).await;
            if matches!(result, Err(ApiError::Aborted)) {
                return;
            }
            launcher.try_update(|l| l.finish_available_search(ticket, result));
        });
    }

    /// Asks for confirmation, installs `name`, then refreshes the installed list.
    pub fn install_package(&self, name: String) {
        if !platform_host_web::confirm(&format!("Install {name}?")) {
            return;
        }
        let runtime = *self;
        let api = self.host.get_value().backend_api();
        spawn_local(async move {
            match packages::install_package(api.as_ref(), &name).await {
                Ok(()) => {
                    logging::log!("installed package {name}");
                    runtime.refresh_installed();
                }
                Err(err) => {
                    logging::warn!("install {name} failed: {err}");
                    platform_host_web::alert(&format!("Failed to install {name}: {err}"));
                }
            }
        });
    }
}

fn install_runtime_orchestration(runtime: DesktopRuntimeContext) {
    runtime
        .host
        .get_value()
        .install_boot_hydration(runtime.dispatch);
    effect_executor::install(runtime);
    runtime.dispatch_action(DesktopAction::SetViewport {
        viewport: runtime.viewport(),
    });
}

#[component]
/// Provides [`DesktopRuntimeContext`] to descendant components and boots persisted state.
pub fn DesktopProvider(
    /// Injected browser or in-memory host bundle assembled by the entry layer.
    host_services: HostServices,
    children: Children,
) -> impl IntoView {
    let host = store_value(DesktopHostContext::new(host_services));
    let state = create_rw_signal(DesktopState::default());
    let interaction = create_rw_signal(InteractionState::default());
    let effects = create_rw_signal(Vec::<RuntimeEffect>::new());
    let launcher = create_rw_signal(Launcher::from_catalog());

    let dispatch = Callback::new(move |action: DesktopAction| {
        let mut desktop = state.get_untracked();
        let mut ui = interaction.get_untracked();
        let previous_desktop = desktop.clone();
        let previous_ui = ui.clone();

        match reduce_desktop(&mut desktop, &mut ui, action) {
            Ok(new_effects) => {
                if desktop != previous_desktop {
                    state.set(desktop);
                }
                if ui != previous_ui {
                    interaction.set(ui);
                }
                if !new_effects.is_empty() {
                    let mut queue = effects.get_untracked();
                    queue.extend(new_effects);
                    effects.set(queue);
                }
            }
            Err(err) => logging::warn!("desktop reducer error: {err}"),
        }
    });

    let runtime = DesktopRuntimeContext {
        host,
        state,
        interaction,
        effects,
        launcher,
        dispatch,
    };

    provide_context(runtime.clone());
    logging::log!(
        "desktop runtime started on {} host",
        host.get_value().host_strategy_name()
    );

    install_runtime_orchestration(runtime);

    children().into_view()
}

/// Returns the current [`DesktopRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`DesktopProvider`].
pub fn use_desktop_runtime() -> DesktopRuntimeContext {
    use_context::<DesktopRuntimeContext>().expect("DesktopRuntimeContext not provided")
}
