//! Package endpoints backing the launcher tabs.

use platform_host::{
    get_json_request, send_json, AbortHandle, ApiError, ApiMethod, ApiRequest, BackendApi,
};
use serde_json::json;

use crate::launcher::{parse_app_entries, AppEntry};

pub const INSTALLED_PATH: &str = "/api/packages/installed";
pub const SEARCH_PATH: &str = "/api/packages/search";
pub const INSTALL_PATH: &str = "/api/packages/install";

pub fn search_path(query: &str) -> String {
    format!("{SEARCH_PATH}?q={}", urlencoding::encode(query.trim()))
}

/// Fetches the installed package list.
///
/// # Errors
///
/// Propagates transport and HTTP status failures.
pub async fn fetch_installed<A: BackendApi + ?Sized>(
    api: &A,
    abort: Option<&AbortHandle>,
) -> Result<Vec<AppEntry>, ApiError> {
    let body = get_json_request(api, ApiRequest::get(INSTALLED_PATH).abort_with(abort)).await?;
    Ok(parse_app_entries(&body))
}

/// Searches packages available for install.
///
/// # Errors
///
/// Propagates transport and HTTP status failures.
pub async fn search_available<A: BackendApi + ?Sized>(
    api: &A,
    query: &str,
    abort: Option<&AbortHandle>,
) -> Result<Vec<AppEntry>, ApiError> {
    let request = ApiRequest::get(search_path(query)).abort_with(abort);
    let body = get_json_request(api, request).await?;
    Ok(parse_app_entries(&body))
}

/// Requests installation of `name`. The caller confirms with the user first.
///
/// # Errors
///
/// Fails for blank names, transport errors, non-2xx statuses, and `{success: false}` replies.
pub async fn install_package<A: BackendApi + ?Sized>(api: &A, name: &str) -> Result<(), ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Rejected("package name is required".to_string()));
    }
    send_json(api, ApiMethod::Post, INSTALL_PATH, json!({ "name": name })).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::MemoryBackendApi;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn search_query_is_url_encoded() {
        assert_eq!(search_path(" media server&x "), "/api/packages/search?q=media%20server%26x");
    }

    #[test]
    fn fetch_installed_decodes_entries() {
        let api = MemoryBackendApi::default();
        api.respond(
            ApiMethod::Get,
            INSTALLED_PATH,
            200,
            json!([{ "name": "Firefox", "categories": ["web"] }]),
        );
        let apps = block_on(fetch_installed(&api, None)).expect("installed list");
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].id, "firefox");
    }

    #[test]
    fn superseded_search_is_aborted() {
        let api = MemoryBackendApi::default();
        api.respond(ApiMethod::Get, &search_path("vim"), 200, json!(["neovim"]));
        let stale = AbortHandle::default();
        stale.abort();

        let result = block_on(search_available(&api, "vim", Some(&stale)));
        assert_eq!(result, Err(ApiError::Aborted));
        let apps = block_on(search_available(&api, "vim", None)).expect("search");
        assert_eq!(apps[0].id, "neovim");
    }

    #[test]
    fn install_posts_name_and_surfaces_rejection() {
        let api = MemoryBackendApi::default();
        api.respond(
            ApiMethod::Post,
            INSTALL_PATH,
            200,
            json!({ "success": false, "error": "already installed" }),
        );
        let result = block_on(install_package(&api, "htop"));
        assert_eq!(
            result,
            Err(ApiError::Rejected("already installed".to_string()))
        );
        let requests = api.requests();
        assert_eq!(requests[0].body, Some(json!({ "name": "htop" })));
    }

    #[test]
    fn install_rejects_blank_names_without_a_request() {
        let api = MemoryBackendApi::default();
        assert!(block_on(install_package(&api, "  ")).is_err());
        assert!(api.requests().is_empty());
    }
}
