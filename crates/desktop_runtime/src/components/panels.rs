use platform_host::ApiError;

use super::*;
use crate::config::PanelManifest;
use crate::panels::{
    connect_wifi, delete_row, load_panel, PanelTable, WifiConnectRequest,
};
use crate::resource::{ResourceState, ResourceTracker};

fn refresh(
    runtime: DesktopRuntimeContext,
    tracker: RwSignal<ResourceTracker<PanelTable>>,
    manifest: &'static PanelManifest,
) {
    let Some(ticket) = tracker.try_update(ResourceTracker::begin) else {
        return;
    };
    let api = runtime.host.get_value().backend_api();
    spawn_local(async move {
        let abort = ticket.abort_handle().clone();
        let result = load_panel(api.as_ref(), manifest, Some(&abort)).await;
        if matches!(result, Err(ApiError::Aborted)) {
            return;
        }
        tracker.try_update(|t| t.finish(ticket, result));
    });
}

/// Aborts the panel's in-flight load when its window closes.
fn cancel_on_unmount(tracker: RwSignal<ResourceTracker<PanelTable>>) {
    on_cleanup(move || {
        tracker.try_with_untracked(ResourceTracker::cancel);
    });
}

#[component]
fn PanelTableView(
    tracker: RwSignal<ResourceTracker<PanelTable>>,
    #[prop(default = None)] on_delete: Option<Callback<String>>,
) -> impl IntoView {
    move || {
        tracker.with(|t| match t.state() {
            ResourceState::Idle | ResourceState::Loading => {
                view! { <p class="panel-status">"Loading…"</p> }.into_view()
            }
            ResourceState::Failed(message) => {
                view! { <p class="panel-status panel-error">{message.clone()}</p> }.into_view()
            }
            ResourceState::Ready(table) if table.is_empty() => {
                view! { <p class="panel-status">"Nothing to show."</p> }.into_view()
            }
            ResourceState::Ready(table) => {
                let header = table
                    .columns
                    .iter()
                    .map(|column| view! { <th>{column.clone()}</th> })
                    .collect_view();
                let rows = table
                    .rows
                    .iter()
                    .map(|row| {
                        let cells = row
                            .cells
                            .iter()
                            .map(|cell| view! { <td>{cell.clone()}</td> })
                            .collect_view();
                        let action = on_delete.zip(row.id.clone()).map(|(on_delete, id)| {
                            view! {
                                <td>
                                    <button
                                        class="panel-row-delete"
                                        on:click=move |_| on_delete.call(id.clone())
                                    >
                                        "Delete"
                                    </button>
                                </td>
                            }
                        });
                        view! { <tr>{cells}{action}</tr> }
                    })
                    .collect_view();
                view! {
                    <table class="panel-table">
                        <thead>
                            <tr>{header}{on_delete.map(|_| view! { <th></th> })}</tr>
                        </thead>
                        <tbody>{rows}</tbody>
                    </table>
                }
                    .into_view()
            }
        })
    }
}

#[component]
pub(super) fn ResourcePanel(manifest: &'static PanelManifest) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let tracker = create_rw_signal(ResourceTracker::new(manifest.display_name.clone()));
    cancel_on_unmount(tracker);
    refresh(runtime, tracker, manifest);

    let on_delete = manifest.id_field.is_some().then(|| {
        Callback::new(move |id: String| {
            let message = format!("Delete {id} from {}?", manifest.display_name);
            if !platform_host_web::confirm(&message) {
                return;
            }
            let api = runtime.host.get_value().backend_api();
            spawn_local(async move {
                match delete_row(api.as_ref(), manifest, &id).await {
                    Ok(()) => logging::log!("deleted {id} from {}", manifest.app_id),
                    Err(err) => {
                        logging::warn!("delete {id} from {} failed: {err}", manifest.app_id);
                        platform_host_web::alert(&format!("Failed to delete {id}: {err}"));
                    }
                }
                refresh(runtime, tracker, manifest);
            });
        })
    });

    view! {
        <div class="resource-panel" data-panel=manifest.app_id.clone()>
            <div class="panel-toolbar">
                <p class="panel-description">{manifest.description.clone()}</p>
                <button
                    disabled=move || tracker.with(|t| t.state().is_loading())
                    on:click=move |_| refresh(runtime, tracker, manifest)
                >
                    "Refresh"
                </button>
            </div>
            <PanelTableView tracker on_delete />
        </div>
    }
}

#[component]
pub(super) fn WifiPanel(manifest: &'static PanelManifest) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let tracker = create_rw_signal(ResourceTracker::new(manifest.display_name.clone()));
    let ssid = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let connecting = create_rw_signal(false);
    cancel_on_unmount(tracker);
    refresh(runtime, tracker, manifest);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let (ssid_value, password_value) = (ssid.get_untracked(), password.get_untracked());
        let request = match WifiConnectRequest::new(&ssid_value, &password_value) {
            Ok(request) => request,
            Err(err) => {
                platform_host_web::alert(&err.to_string());
                return;
            }
        };
        let Some(ticket) = tracker.try_update(ResourceTracker::begin) else {
            return;
        };
        connecting.set(true);
        let api = runtime.host.get_value().backend_api();
        spawn_local(async move {
            let abort = ticket.abort_handle().clone();
            let outcome = connect_wifi(api.as_ref(), manifest, &request, Some(&abort)).await;
            if let Err(err) = &outcome.connect {
                platform_host_web::alert(&format!("Failed to connect to {}: {err}", request.ssid));
            } else {
                password.try_set(String::new());
            }
            if !matches!(outcome.networks, Err(ApiError::Aborted)) {
                tracker.try_update(|t| t.finish(ticket, outcome.networks));
            }
            connecting.try_set(false);
        });
    };

    view! {
        <div class="resource-panel wifi-panel">
            <form class="wifi-connect" on:submit=on_submit>
                <input
                    type="text"
                    placeholder="Network name (SSID)"
                    prop:value=move || ssid.get()
                    on:input=move |ev| ssid.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || connecting.get()>
                    "Connect"
                </button>
            </form>
            <div class="panel-toolbar">
                <button
                    disabled=move || tracker.with(|t| t.state().is_loading())
                    on:click=move |_| refresh(runtime, tracker, manifest)
                >
                    "Refresh"
                </button>
            </div>
            <PanelTableView tracker />
        </div>
    }
}
