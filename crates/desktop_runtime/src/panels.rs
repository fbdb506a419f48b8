//! Generic resource panels: fetch an endpoint, render rows, and run row actions.
//!
//! Every management panel (pools, shares, power rules, media libraries, AI tasks, containers,
//! WiFi) is a [`PanelManifest`] plus this module. Errors never escape a panel; callers feed the
//! results into a [`crate::resource::ResourceTracker`] which turns them into inline text.

use platform_host::{
    delete_json, get_json_request, send_json, AbortHandle, ApiError, ApiMethod, ApiRequest,
    BackendApi,
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{desktop_config, PanelManifest};

/// Keys checked, in order, when a list endpoint wraps its array in an object.
const WRAPPER_KEYS: [&str; 6] = ["items", "data", "results", "networks", "rules", "libraries"];
const EMPTY_CELL: &str = "-";

pub const WIFI_CONNECT_PATH: &str = "/api/wifi-management/connect";

#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow {
    /// Value of the manifest's `id_field`, when present.
    pub id: Option<String>,
    pub cells: Vec<String>,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelTable {
    pub columns: Vec<String>,
    pub rows: Vec<PanelRow>,
}

impl PanelTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Renders one JSON value as table cell text.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => EMPTY_CELL.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => String::from(if *flag { "yes" } else { "no" }),
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => other.to_string(),
    }
}

fn list_items(body: &Value) -> Vec<Value> {
    if let Some(items) = body.as_array() {
        return items.clone();
    }
    let Some(object) = body.as_object() else {
        return Vec::new();
    };
    WRAPPER_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array))
        .or_else(|| object.values().find_map(Value::as_array))
        .cloned()
        // A lone object is a one-row table.
        .unwrap_or_else(|| vec![body.clone()])
}

/// Builds a table from a list response.
///
/// Columns come from the manifest; when it names none they are taken from the first row's keys.
/// Scalar items become single-cell `value` rows.
pub fn table_from_json(body: &Value, columns: &[String], id_field: Option<&str>) -> PanelTable {
    let items = list_items(body);
    let columns: Vec<String> = if columns.is_empty() {
        items
            .iter()
            .find_map(Value::as_object)
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_else(|| vec!["value".to_string()])
    } else {
        columns.to_vec()
    };

    let rows = items
        .into_iter()
        .map(|item| {
            let object = match &item {
                Value::Object(map) => map.clone(),
                scalar => {
                    let mut map = Map::new();
                    map.insert("value".to_string(), scalar.clone());
                    map
                }
            };
            PanelRow {
                id: id_field
                    .and_then(|field| object.get(field))
                    .filter(|v| !v.is_null())
                    .map(|v| cell_text(Some(v))),
                cells: columns.iter().map(|c| cell_text(object.get(c))).collect(),
                raw: item,
            }
        })
        .collect();

    PanelTable { columns, rows }
}

/// Fetches a panel's endpoint and shapes it into a table.
///
/// # Errors
///
/// Returns [`ApiError::Unavailable`] for panels without an endpoint, [`ApiError::Aborted`] when
/// `abort` fires first, otherwise the transport or status failure.
pub async fn load_panel<A: BackendApi + ?Sized>(
    api: &A,
    manifest: &PanelManifest,
    abort: Option<&AbortHandle>,
) -> Result<PanelTable, ApiError> {
    let endpoint = manifest.endpoint.as_deref().ok_or(ApiError::Unavailable)?;
    let request = ApiRequest::get(endpoint)
        .timeout(desktop_config().request_timeout(manifest.timeout_ms))
        .abort_with(abort);
    let body = get_json_request(api, request).await?;
    Ok(table_from_json(
        &body,
        &manifest.columns,
        manifest.id_field.as_deref(),
    ))
}

pub fn row_path(endpoint: &str, id: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        urlencoding::encode(id)
    )
}

/// Deletes one row. The caller gates this behind a confirmation.
///
/// # Errors
///
/// Fails when the panel has no endpoint or the backend refuses the request.
pub async fn delete_row<A: BackendApi + ?Sized>(
    api: &A,
    manifest: &PanelManifest,
    id: &str,
) -> Result<(), ApiError> {
    let endpoint = manifest.endpoint.as_deref().ok_or(ApiError::Unavailable)?;
    delete_json(api, &row_path(endpoint, id)).await?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WifiError {
    #[error("Please enter a network name (SSID).")]
    MissingSsid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WifiConnectRequest {
    pub ssid: String,
    pub password: String,
}

impl WifiConnectRequest {
    /// Validates form input before any request is made.
    ///
    /// # Errors
    ///
    /// Returns [`WifiError::MissingSsid`] for a blank SSID.
    pub fn new(ssid: &str, password: &str) -> Result<Self, WifiError> {
        let ssid = ssid.trim();
        if ssid.is_empty() {
            return Err(WifiError::MissingSsid);
        }
        Ok(Self {
            ssid: ssid.to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WifiConnectOutcome {
    pub connect: Result<(), ApiError>,
    pub networks: Result<PanelTable, ApiError>,
}

/// Posts a connect request, then reloads the network list whatever the POST returned.
///
/// `abort` applies to the reload only.
pub async fn connect_wifi<A: BackendApi + ?Sized>(
    api: &A,
    manifest: &PanelManifest,
    request: &WifiConnectRequest,
    abort: Option<&AbortHandle>,
) -> WifiConnectOutcome {
    let body = match serde_json::to_value(request) {
        Ok(body) => body,
        Err(err) => {
            return WifiConnectOutcome {
                connect: Err(ApiError::Decode(err.to_string())),
                networks: load_panel(api, manifest, abort).await,
            }
        }
    };
    let connect = send_json(api, ApiMethod::Post, WIFI_CONNECT_PATH, body)
        .await
        .map(|_| ());
    if let Err(err) = &connect {
        leptos::logging::warn!("wifi connect to {} failed: {err}", request.ssid);
    }
    WifiConnectOutcome {
        connect,
        networks: load_panel(api, manifest, abort).await,
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::MemoryBackendApi;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::config::panel_manifest;
    use crate::resource::ResourceTracker;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn table_uses_manifest_columns_and_id_field() {
        let table = table_from_json(
            &json!([
                { "id": 4, "name": "media", "protocol": "smb", "readOnly": true },
                { "id": 5, "name": "backup", "protocol": "nfs" }
            ]),
            &columns(&["name", "protocol", "readOnly"]),
            Some("id"),
        );
        assert_eq!(table.rows[0].id.as_deref(), Some("4"));
        assert_eq!(table.rows[0].cells, vec!["media", "smb", "yes"]);
        assert_eq!(table.rows[1].cells, vec!["backup", "nfs", "-"]);
    }

    #[test]
    fn wrapped_lists_and_inferred_columns() {
        let table = table_from_json(
            &json!({ "total": 1, "networks": [{ "ssid": "Home", "signal": 70 }] }),
            &[],
            None,
        );
        let mut inferred = table.columns.clone();
        inferred.sort();
        assert_eq!(inferred, columns(&["signal", "ssid"]));
        let ssid = table
            .columns
            .iter()
            .position(|c| c == "ssid")
            .expect("ssid column");
        assert_eq!(table.rows[0].cells[ssid], "Home");
    }

    #[test]
    fn scalar_lists_become_value_rows() {
        let table = table_from_json(&json!(["a", "b"]), &[], None);
        assert_eq!(table.columns, columns(&["value"]));
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn failed_load_is_an_error_not_a_panic() {
        let api = MemoryBackendApi::default();
        let manifest = panel_manifest("storage-pools").expect("pools panel");
        api.respond(ApiMethod::Get, "/api/storage-pools", 500, json!({ "error": "boom" }));
        let result = block_on(load_panel(&api, manifest, None));
        assert!(matches!(result, Err(ApiError::Status { status: 500, .. })));
    }

    #[test]
    fn containers_request_carries_the_abort_timeout() {
        let api = MemoryBackendApi::default();
        let manifest = panel_manifest("containers").expect("containers panel");
        api.respond(ApiMethod::Get, "/api/containers", 200, json!([]));
        block_on(load_panel(&api, manifest, None)).expect("containers");
        assert_eq!(api.requests()[0].timeout_ms, Some(15_000));
    }

    #[test]
    fn superseded_container_load_is_aborted() {
        let api = MemoryBackendApi::default();
        let manifest = panel_manifest("containers").expect("containers panel");
        api.respond(ApiMethod::Get, "/api/containers", 200, json!([{ "id": "web" }]));

        let mut tracker = ResourceTracker::<PanelTable>::new("Containers");
        let stale = tracker.begin();
        let fresh = tracker.begin();

        let result = block_on(load_panel(&api, manifest, Some(stale.abort_handle())));
        assert_eq!(result, Err(ApiError::Aborted));
        let table = block_on(load_panel(&api, manifest, Some(fresh.abort_handle())));
        assert!(tracker.finish(fresh, table));
        assert_eq!(tracker.state().ready().map(|t| t.rows.len()), Some(1));

        let requests = api.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.timeout_ms == Some(15_000)));
    }

    #[test]
    fn unmounted_panel_abort_cancels_the_load() {
        let api = MemoryBackendApi::default();
        let manifest = panel_manifest("shares").expect("shares panel");
        api.respond(ApiMethod::Get, "/api/shares", 200, json!([]));

        let mut tracker = ResourceTracker::<PanelTable>::new("Shares");
        let ticket = tracker.begin();
        tracker.cancel();
        let result = block_on(load_panel(&api, manifest, Some(ticket.abort_handle())));
        assert_eq!(result, Err(ApiError::Aborted));
    }

    #[test]
    fn delete_addresses_the_row_by_encoded_id() {
        let api = MemoryBackendApi::default();
        let manifest = panel_manifest("storage-pools").expect("pools panel");
        api.respond(
            ApiMethod::Delete,
            "/api/storage-pools/tank%2Fdata",
            200,
            json!({ "success": true }),
        );
        block_on(delete_row(&api, manifest, "tank/data")).expect("deleted");
    }

    #[test]
    fn wifi_ssid_is_required() {
        assert_eq!(WifiConnectRequest::new("  ", "x"), Err(WifiError::MissingSsid));
    }

    #[test]
    fn wifi_connect_failure_still_refreshes_networks() {
        let api = MemoryBackendApi::default();
        let manifest = panel_manifest("wifi").expect("wifi panel");
        api.respond(ApiMethod::Post, WIFI_CONNECT_PATH, 500, json!({ "error": "driver" }));
        api.respond(
            ApiMethod::Get,
            "/api/wifi-management/networks",
            200,
            json!([{ "ssid": "Home", "signal": 80, "security": "wpa2", "connected": false }]),
        );

        let request = WifiConnectRequest::new("Home", "x").expect("valid");
        let outcome = block_on(connect_wifi(&api, manifest, &request, None));

        assert!(matches!(outcome.connect, Err(ApiError::Status { status: 500, .. })));
        assert_eq!(outcome.networks.expect("networks").rows.len(), 1);
        let requests = api.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, Some(json!({ "ssid": "Home", "password": "x" })));
        assert_eq!(requests[1].method, ApiMethod::Get);
    }
}
