use serde_json::Value;

use super::*;
use crate::launcher::slugify;
use crate::layout::{LayoutTemplate, LayoutTemplateStore};

const TEMPLATE_TYPES: [&str; 6] = [
    "grid",
    "cascade",
    "vertical",
    "horizontal",
    "master-stack",
    "custom",
];

/// Builds a user template from the form fields.
///
/// A blank config means `{}`, so the type's defaults apply.
fn template_from_form(name: &str, kind: &str, config: &str) -> Result<LayoutTemplate, String> {
    let config = if config.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(config).map_err(|err| format!("Invalid config JSON: {err}"))?
    };
    Ok(LayoutTemplate::new(
        slugify(name),
        name.trim(),
        kind.trim(),
        config,
    ))
}

#[component]
pub(super) fn LayoutToolsPanel() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    let name = create_rw_signal(String::new());
    let kind = create_rw_signal(TEMPLATE_TYPES[0].to_string());
    let config = create_rw_signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let template = match template_from_form(
            &name.get_untracked(),
            &kind.get_untracked(),
            &config.get_untracked(),
        ) {
            Ok(template) => template,
            Err(message) => {
                platform_host_web::alert(&message);
                return;
            }
        };
        if template.name.is_empty() {
            platform_host_web::alert("Please enter a template name.");
            return;
        }
        if LayoutTemplateStore::is_builtin(&template.id) {
            platform_host_web::alert("Built-in templates cannot be replaced.");
            return;
        }
        runtime.dispatch_action(DesktopAction::SaveLayoutTemplate { template });
        name.set(String::new());
        config.set(String::new());
    };

    view! {
        <div class="layout-tools">
            <ul class="layout-template-list">
                <For
                    each=move || state.get().templates.templates()
                    key=|template| (template.id.clone(), template.name.clone(), template.kind.clone())
                    let:template
                >
                    {{
                        let builtin = LayoutTemplateStore::is_builtin(&template.id);
                        let apply_id = template.id.clone();
                        let delete_id = template.id.clone();
                        let active_id = template.id.clone();
                        view! {
                            <li
                                class="layout-template"
                                class:active=move || {
                                    state.get().active_template.as_deref() == Some(active_id.as_str())
                                }
                            >
                                <span class="layout-template-name">{template.name.clone()}</span>
                                <span class="layout-template-type">{template.kind.clone()}</span>
                                <button on:click=move |_| {
                                    runtime
                                        .dispatch_action(DesktopAction::ApplyLayoutTemplate {
                                            template_id: apply_id.clone(),
                                        });
                                }>
                                    "Apply"
                                </button>
                                {(!builtin)
                                    .then(|| {
                                        view! {
                                            <button on:click=move |_| {
                                                if platform_host_web::confirm(
                                                    &format!("Delete layout {}?", delete_id),
                                                ) {
                                                    runtime
                                                        .dispatch_action(DesktopAction::DeleteLayoutTemplate {
                                                            template_id: delete_id.clone(),
                                                        });
                                                }
                                            }>
                                                "Delete"
                                            </button>
                                        }
                                    })}
                            </li>
                        }
                    }}
                </For>
            </ul>

            <form class="layout-template-form" on:submit=on_submit>
                <input
                    type="text"
                    placeholder="Template name"
                    prop:value=move || name.get()
                    on:input=move |ev| name.set(event_target_value(&ev))
                />
                <select
                    prop:value=move || kind.get()
                    on:change=move |ev| kind.set(event_target_value(&ev))
                >
                    {TEMPLATE_TYPES
                        .into_iter()
                        .map(|kind| view! { <option value=kind>{kind}</option> })
                        .collect_view()}
                </select>
                <textarea
                    placeholder=r#"Config JSON, e.g. {"rows": 2, "cols": 2}"#
                    prop:value=move || config.get()
                    on:input=move |ev| config.set(event_target_value(&ev))
                ></textarea>
                <button type="submit">"Save template"</button>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::layout::LayoutGeometry;

    #[test]
    fn form_builds_a_slugged_template() {
        let template =
            template_from_form(" Wide Grid ", "grid", r#"{"rows": 1, "cols": 3}"#).expect("valid");
        assert_eq!(template.id, "wide-grid");
        assert_eq!(template.name, "Wide Grid");
        assert_eq!(template.config, json!({ "rows": 1, "cols": 3 }));
        assert_eq!(template.geometry(), LayoutGeometry::Grid { rows: 1, cols: 3 });
    }

    #[test]
    fn blank_config_uses_type_defaults() {
        let template = template_from_form("Steps", "cascade", "  ").expect("valid");
        assert_eq!(template.config, json!({}));
    }

    #[test]
    fn malformed_config_is_reported() {
        assert!(template_from_form("Bad", "grid", "{rows").is_err());
    }
}
