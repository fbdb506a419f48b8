//! `fetch`-backed [`BackendApi`] adapter.
//!
//! Requests carrying `timeout_ms` or an [`platform_host::AbortHandle`] are bound to an
//! `AbortController`. A request cut off by its deadline resolves to [`ApiError::TimedOut`]; one
//! cut off by its handle resolves to [`ApiError::Aborted`]. Bodies that fail to parse as JSON are
//! kept as a JSON string on error statuses so the caller can still show the backend's message.

use platform_host::{ApiError, ApiFuture, ApiRequest, ApiResponse, BackendApi};

#[derive(Debug, Clone, Default)]
/// Backend transport over `window.fetch`.
pub struct WebBackendApi {
    base_url: String,
}

impl WebBackendApi {
    /// Creates a transport that prefixes every path with `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolves a request path against the configured base.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl BackendApi for WebBackendApi {
    fn send<'a>(&'a self, request: ApiRequest) -> ApiFuture<'a, Result<ApiResponse, ApiError>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let url = self.url_for(&request.path);
                fetch_json(&url, request).await
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = request;
                Err(ApiError::Unavailable)
            }
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn network_error(err: wasm_bindgen::JsValue) -> ApiError {
    ApiError::Network(format!("{err:?}"))
}

#[cfg(target_arch = "wasm32")]
fn is_abort(err: &wasm_bindgen::JsValue) -> bool {
    use wasm_bindgen::JsCast;

    err.dyn_ref::<web_sys::DomException>()
        .map(|e| e.name() == "AbortError")
        .unwrap_or(false)
}

#[cfg(target_arch = "wasm32")]
async fn fetch_json(url: &str, request: ApiRequest) -> Result<ApiResponse, ApiError> {
    use std::{cell::Cell, rc::Rc};

    use serde_json::Value;
    use wasm_bindgen::{closure::Closure, JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    if request.is_aborted() {
        return Err(ApiError::Aborted);
    }
    let window = web_sys::window().ok_or(ApiError::Unavailable)?;
    let init = web_sys::RequestInit::new();
    init.set_method(request.method.as_str());

    let headers = web_sys::Headers::new().map_err(network_error)?;
    headers
        .set("Accept", "application/json")
        .map_err(network_error)?;
    if let Some(body) = &request.body {
        headers
            .set("Content-Type", "application/json")
            .map_err(network_error)?;
        let raw = serde_json::to_string(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        init.set_body(&JsValue::from_str(&raw));
    }
    init.set_headers(&headers);

    let mut timer = None;
    let timed_out = Rc::new(Cell::new(false));
    if request.timeout_ms.is_some() || request.abort.is_some() {
        let controller = web_sys::AbortController::new().map_err(network_error)?;
        init.set_signal(Some(&controller.signal()));
        if let Some(handle) = &request.abort {
            let controller = controller.clone();
            handle.on_abort(move || controller.abort());
        }
        if let Some(timeout_ms) = request.timeout_ms {
            let flag = Rc::clone(&timed_out);
            let on_timeout = Closure::once_into_js(move || {
                flag.set(true);
                controller.abort();
            });
            timer = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    on_timeout.unchecked_ref(),
                    i32::try_from(timeout_ms).unwrap_or(i32::MAX),
                )
                .ok();
        }
    }

    let web_request =
        web_sys::Request::new_with_str_and_init(url, &init).map_err(network_error)?;
    let outcome = JsFuture::from(window.fetch_with_request(&web_request)).await;
    if let Some(handle) = timer {
        window.clear_timeout_with_handle(handle);
    }

    let response: web_sys::Response = outcome
        .map_err(|err| {
            if is_abort(&err) && timed_out.get() {
                ApiError::TimedOut
            } else if is_abort(&err) {
                ApiError::Aborted
            } else {
                network_error(err)
            }
        })?
        .dyn_into()
        .map_err(network_error)?;

    let status = response.status();
    let text = JsFuture::from(response.text().map_err(network_error)?)
        .await
        .map_err(network_error)?
        .as_string()
        .unwrap_or_default();

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(err) if response.ok() => return Err(ApiError::Decode(err.to_string())),
            Err(_) => Value::String(text),
        }
    };

    Ok(ApiResponse { status, body })
}
