use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const PANEL_MANIFESTS: [&str; 9] = [
    "storage-pools",
    "shares",
    "wifi",
    "power",
    "media-server",
    "ai-integration",
    "containers",
    "display-settings",
    "layout-tools",
];

const PANEL_KINDS: [&str; 4] = ["resource", "wifi", "display-settings", "layout-tools"];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WindowDefaults {
    width: i32,
    height: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PanelManifest {
    schema_version: u32,
    app_id: String,
    display_name: String,
    icon: String,
    description: String,
    #[serde(default)]
    categories: Vec<String>,
    kind: String,
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    id_field: Option<String>,
    #[serde(default)]
    timeout_ms: Option<u32>,
    window_defaults: WindowDefaults,
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> T {
    println!("cargo:rerun-if-changed={}", path.display());
    let raw = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
    toml::from_str(&raw).unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()))
}

fn validate_panel(path: &Path, manifest: &PanelManifest) {
    if manifest.schema_version != 1 {
        panic!(
            "manifest schema mismatch in {}: expected 1 found {}",
            path.display(),
            manifest.schema_version
        );
    }
    if !PANEL_KINDS.contains(&manifest.kind.as_str()) {
        panic!("unknown panel kind `{}` in {}", manifest.kind, path.display());
    }
    let needs_endpoint = matches!(manifest.kind.as_str(), "resource" | "wifi");
    let endpoint_ok = manifest
        .endpoint
        .as_deref()
        .is_some_and(|endpoint| endpoint.starts_with("/api/"));
    if needs_endpoint && !endpoint_ok {
        panic!(
            "panel {} in {} needs an `/api/...` endpoint",
            manifest.app_id,
            path.display()
        );
    }
}

fn main() {
    let crate_root = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let config_dir = crate_root.join("config");

    let desktop_path = config_dir.join("desktop.toml");
    let desktop: toml::Value = read_toml(&desktop_path);
    if desktop.get("schema_version").and_then(toml::Value::as_integer) != Some(1) {
        panic!("{} must declare schema_version = 1", desktop_path.display());
    }

    let mut panels = Vec::<PanelManifest>::new();
    for name in PANEL_MANIFESTS {
        let path = config_dir.join("panels").join(format!("{name}.toml"));
        let manifest: PanelManifest = read_toml(&path);
        validate_panel(&path, &manifest);
        panels.push(manifest);
    }

    let desktop_json = serde_json::to_string_pretty(&desktop).expect("serialize desktop config");
    let panels_json = serde_json::to_string_pretty(&panels).expect("serialize panel catalog");
    let generated = format!(
        "/// Build-time desktop configuration JSON.\n\
pub const DESKTOP_CONFIG_JSON: &str = r##\"{desktop_json}\"##;\n\
/// Build-time panel catalog JSON.\n\
pub const PANEL_CATALOG_JSON: &str = r##\"{panels_json}\"##;\n"
    );

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR"));
    let out_file = out_dir.join("desktop_catalog_generated.rs");
    fs::write(&out_file, generated)
        .unwrap_or_else(|err| panic!("failed to write {}: {err}", out_file.display()));
}
