use super::*;
use crate::launcher::{AppEntry, Launcher, LauncherCommand, LauncherKey, LauncherTab};
use crate::resource::ResourceState;

const SEARCH_INPUT_ID: &str = "launcher-search-input";

fn focus_search_input() {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;

        let Some(element) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(SEARCH_INPUT_ID))
        else {
            return;
        };
        if let Ok(input) = element.dyn_into::<web_sys::HtmlElement>() {
            let _ = input.focus();
        }
    }
}

fn run_command(runtime: DesktopRuntimeContext, command: LauncherCommand) {
    match command {
        LauncherCommand::Launch(entry) => runtime.launch(&entry),
        LauncherCommand::Install(name) => runtime.install_package(name),
        LauncherCommand::SearchAvailable(query) => runtime.search_available(query),
        LauncherCommand::Closed => {}
    }
}

fn status_text(status: &ResourceState<Vec<AppEntry>>) -> Option<String> {
    match status {
        ResourceState::Loading => Some("Loading…".to_string()),
        ResourceState::Failed(message) => Some(message.clone()),
        ResourceState::Idle | ResourceState::Ready(_) => None,
    }
}

#[component]
pub(super) fn LauncherOverlay() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let launcher = runtime.launcher;
    let state = runtime.state;

    let is_open = create_memo(move |_| launcher.with(|l| l.state.open));
    create_effect(move |_| {
        if is_open.get() {
            focus_search_input();
        }
    });

    let running_titles = move || state.with(|desktop| desktop.running_titles());
    let results = create_memo(move |_| {
        let running = running_titles();
        launcher.with(|l| l.results(&running))
    });

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        let Some(key) = LauncherKey::from_key(&ev.key()) else {
            return;
        };
        ev.prevent_default();
        ev.stop_propagation();
        let running = state.with_untracked(|desktop| desktop.running_titles());
        let command = launcher
            .try_update(|l| l.handle_key(key, &running))
            .flatten();
        if let Some(command) = command {
            run_command(runtime, command);
        }
    };

    let on_input = move |ev: web_sys::Event| {
        let query = event_target_value(&ev);
        launcher.update(|l| l.set_query(query.clone()));
        if launcher.with_untracked(|l| l.state.current_tab) == LauncherTab::Available {
            runtime.search_available(query);
        }
    };

    let switch_tab = move |tab: LauncherTab| {
        launcher.update(|l| l.switch_tab(tab));
        if tab == LauncherTab::Available {
            let query = launcher.with_untracked(|l| l.state.search_filter.clone());
            runtime.search_available(query);
        }
    };

    let activate = move |index: usize| {
        launcher.update(|l| l.select(index));
        let running = state.with_untracked(|desktop| desktop.running_titles());
        let command = launcher
            .try_update(|l| l.handle_key(LauncherKey::Enter, &running))
            .flatten();
        if let Some(command) = command {
            run_command(runtime, command);
        }
    };

    view! {
        <Show when=move || is_open.get() fallback=|| ()>
            <div
                class="launcher-backdrop"
                on:mousedown=move |_| launcher.update(Launcher::close)
            >
                <div
                    class="launcher"
                    role="dialog"
                    aria-label="App launcher"
                    on:mousedown=move |ev| ev.stop_propagation()
                >
                    <input
                        id=SEARCH_INPUT_ID
                        class="launcher-search"
                        type="search"
                        placeholder="Search apps"
                        autocomplete="off"
                        prop:value=move || launcher.with(|l| l.state.search_filter.clone())
                        on:input=on_input
                        on:keydown=on_keydown
                    />
                    <div class="launcher-tabs" role="tablist">
                        {[LauncherTab::Installed, LauncherTab::Available]
                            .into_iter()
                            .map(|tab| {
                                view! {
                                    <button
                                        role="tab"
                                        aria-selected=move || {
                                            launcher
                                                .with(|l| l.state.current_tab == tab)
                                                .to_string()
                                        }
                                        on:click=move |_| switch_tab(tab)
                                    >
                                        {tab.label()}
                                    </button>
                                }
                            })
                            .collect_view()}
                    </div>
                    {move || {
                        launcher
                            .with(|l| status_text(l.tab_status()))
                            .map(|text| view! { <p class="launcher-status">{text}</p> })
                    }}
                    <ul class="launcher-results" role="listbox">
                        {move || {
                            let selected = launcher.with(|l| l.state.selected_index);
                            let running = running_titles();
                            results
                                .get()
                                .into_iter()
                                .enumerate()
                                .map(|(index, entry)| {
                                    let is_running = crate::search::is_running(&entry, &running);
                                    let class_name = format!(
                                        "launcher-result{}{}",
                                        if index == selected { " selected" } else { "" },
                                        if is_running { " running" } else { "" },
                                    );
                                    view! {
                                        <li
                                            class=class_name
                                            role="option"
                                            aria-selected=(index == selected).to_string()
                                            on:mouseenter=move |_| launcher.update(|l| l.select(index))
                                            on:click=move |_| activate(index)
                                        >
                                            <span class="launcher-result-icon" data-icon=entry.icon.clone()></span>
                                            <span class="launcher-result-name">{entry.name.clone()}</span>
                                            <span class="launcher-result-description">
                                                {entry.description.clone()}
                                            </span>
                                        </li>
                                    }
                                })
                                .collect_view()
                        }}
                    </ul>
                </div>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn status_text_covers_loading_and_failure() {
        assert_eq!(
            status_text(&ResourceState::Loading),
            Some("Loading…".to_string())
        );
        assert_eq!(
            status_text(&ResourceState::Failed("Failed to load installed apps".to_string())),
            Some("Failed to load installed apps".to_string())
        );
        assert_eq!(status_text(&ResourceState::Ready(Vec::new())), None);
    }
}
