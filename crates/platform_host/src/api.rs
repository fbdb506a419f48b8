//! Backend REST transport contracts.
//!
//! Every management panel talks to the backend through [`BackendApi`]: `GET` returns a JSON array
//! or object to render, and `POST`/`PUT`/`DELETE` mutate backend state and answer either
//! `{success, error?}` or the updated resource. All bodies are `application/json`.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Object-safe boxed future used by [`BackendApi`].
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// HTTP verbs used by the desktop panels.
pub enum ApiMethod {
    /// Read a resource.
    Get,
    /// Create a resource or trigger an action.
    Post,
    /// Replace a resource.
    Put,
    /// Remove a resource.
    Delete,
}

impl ApiMethod {
    /// Returns the wire token for the verb.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
struct AbortInner {
    aborted: Cell<bool>,
    listeners: RefCell<Vec<Box<dyn FnOnce()>>>,
}

#[derive(Clone, Default)]
/// Cancels the in-flight requests that carry it. Clones share one abort flag.
pub struct AbortHandle {
    inner: Rc<AbortInner>,
}

impl AbortHandle {
    /// Aborts every request bound to this handle. Later calls do nothing.
    pub fn abort(&self) {
        if self.inner.aborted.replace(true) {
            return;
        }
        let listeners = self.inner.listeners.take();
        for listener in listeners {
            listener();
        }
    }

    /// Returns whether [`AbortHandle::abort`] has been called.
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.get()
    }

    /// Runs `listener` once on abort, immediately when already aborted.
    pub fn on_abort(&self, listener: impl FnOnce() + 'static) {
        if self.is_aborted() {
            listener();
        } else {
            self.inner.listeners.borrow_mut().push(Box::new(listener));
        }
    }
}

impl PartialEq for AbortHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for AbortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortHandle")
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One backend request.
pub struct ApiRequest {
    /// HTTP verb.
    pub method: ApiMethod,
    /// Path relative to the configured API base, including any query string.
    pub path: String,
    /// JSON body for mutating verbs.
    pub body: Option<Value>,
    /// Abort the request after this many milliseconds.
    pub timeout_ms: Option<u32>,
    /// Caller-owned cancellation.
    #[serde(skip)]
    pub abort: Option<AbortHandle>,
}

impl ApiRequest {
    /// Builds a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: ApiMethod::Get,
            path: path.into(),
            body: None,
            timeout_ms: None,
            abort: None,
        }
    }

    /// Builds a request carrying a JSON body.
    pub fn with_body(method: ApiMethod, path: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            body: Some(body),
            timeout_ms: None,
            abort: None,
        }
    }

    /// Sets an abort timeout.
    pub fn timeout(mut self, timeout_ms: Option<u32>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Binds the request to `handle`.
    pub fn abort_with(mut self, handle: Option<&AbortHandle>) -> Self {
        self.abort = handle.cloned();
        self
    }

    /// Returns whether the request's handle has already fired.
    pub fn is_aborted(&self) -> bool {
        self.abort.as_ref().is_some_and(AbortHandle::is_aborted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Decoded backend response.
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body (`Null` for empty bodies).
    pub body: Value,
}

impl ApiResponse {
    /// Builds a `200 OK` response.
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// Returns whether the status is in the 2xx range.
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure talking to the backend.
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error text extracted from the body, or the status reason.
        message: String,
    },
    /// The body was not the JSON shape the caller expected.
    #[error("invalid response: {0}")]
    Decode(String),
    /// The backend answered `{success: false}`.
    #[error("{0}")]
    Rejected(String),
    /// The request was aborted by its timeout.
    #[error("request timed out")]
    TimedOut,
    /// The caller aborted the request.
    #[error("request aborted")]
    Aborted,
    /// No transport exists on this target.
    #[error("backend unavailable")]
    Unavailable,
}

/// Host transport for backend REST calls.
pub trait BackendApi {
    /// Sends `request` and resolves with the decoded response (any status).
    fn send<'a>(&'a self, request: ApiRequest) -> ApiFuture<'a, Result<ApiResponse, ApiError>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// `{success, error?}` reply used by mutating endpoints.
pub struct MutationReply {
    /// Whether the backend applied the mutation.
    #[serde(default = "default_true")]
    pub success: bool,
    /// Backend-provided failure text.
    #[serde(default)]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

fn status_error(response: &ApiResponse) -> ApiError {
    let message = response
        .body
        .get("error")
        .or_else(|| response.body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", response.status));
    ApiError::Status {
        status: response.status,
        message,
    }
}

/// Issues a `GET` and returns the JSON body.
///
/// # Errors
///
/// Returns transport errors and [`ApiError::Status`] for non-2xx responses.
pub async fn get_json<A: BackendApi + ?Sized>(api: &A, path: &str) -> Result<Value, ApiError> {
    get_json_request(api, ApiRequest::get(path)).await
}

/// Sends a prepared `GET` (timeout, abort handle) and returns the JSON body.
///
/// # Errors
///
/// Same as [`get_json`], plus [`ApiError::TimedOut`] and [`ApiError::Aborted`].
pub async fn get_json_request<A: BackendApi + ?Sized>(
    api: &A,
    request: ApiRequest,
) -> Result<Value, ApiError> {
    let response = api.send(request).await?;
    if !response.is_success() {
        return Err(status_error(&response));
    }
    Ok(response.body)
}

/// Issues a mutating request and interprets the reply.
///
/// Objects carrying `success: false` become [`ApiError::Rejected`]; any other 2xx body (an updated
/// resource, or nothing at all) is returned as-is.
///
/// # Errors
///
/// Returns transport errors, [`ApiError::Status`] for non-2xx responses and
/// [`ApiError::Rejected`] for refused mutations.
pub async fn send_json<A: BackendApi + ?Sized>(
    api: &A,
    method: ApiMethod,
    path: &str,
    body: Value,
) -> Result<Value, ApiError> {
    mutate(api, ApiRequest::with_body(method, path, body)).await
}

/// Issues a body-less `DELETE` and interprets the reply like [`send_json`].
///
/// # Errors
///
/// Same as [`send_json`].
pub async fn delete_json<A: BackendApi + ?Sized>(api: &A, path: &str) -> Result<Value, ApiError> {
    let request = ApiRequest {
        method: ApiMethod::Delete,
        ..ApiRequest::get(path)
    };
    mutate(api, request).await
}

async fn mutate<A: BackendApi + ?Sized>(api: &A, request: ApiRequest) -> Result<Value, ApiError> {
    let response = api.send(request).await?;
    if !response.is_success() {
        return Err(status_error(&response));
    }
    if response.body.get("success").is_some() {
        let reply: MutationReply = serde_json::from_value(response.body.clone())
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        if !reply.success {
            return Err(ApiError::Rejected(
                reply
                    .error
                    .unwrap_or_else(|| "the backend rejected the request".to_string()),
            ));
        }
    }
    Ok(response.body)
}

#[derive(Debug, Clone, Copy, Default)]
/// Transport for targets without network access; every call fails with
/// [`ApiError::Unavailable`].
pub struct NoopBackendApi;

impl BackendApi for NoopBackendApi {
    fn send<'a>(&'a self, _request: ApiRequest) -> ApiFuture<'a, Result<ApiResponse, ApiError>> {
        Box::pin(async { Err(ApiError::Unavailable) })
    }
}

#[derive(Debug, Default)]
struct MemoryBackendInner {
    routes: HashMap<(ApiMethod, String), Result<ApiResponse, ApiError>>,
    requests: Vec<ApiRequest>,
}

#[derive(Debug, Clone, Default)]
/// Scripted in-memory backend. Unrouted requests answer `404` and already-aborted requests fail
/// with [`ApiError::Aborted`]. Clones share routes and the request log.
pub struct MemoryBackendApi {
    inner: Rc<RefCell<MemoryBackendInner>>,
}

impl MemoryBackendApi {
    /// Routes `method path` to a fixed response.
    pub fn respond(&self, method: ApiMethod, path: &str, status: u16, body: Value) -> &Self {
        self.inner.borrow_mut().routes.insert(
            (method, path.to_string()),
            Ok(ApiResponse { status, body }),
        );
        self
    }

    /// Routes `method path` to a transport failure.
    pub fn fail(&self, method: ApiMethod, path: &str, error: ApiError) -> &Self {
        self.inner
            .borrow_mut()
            .routes
            .insert((method, path.to_string()), Err(error));
        self
    }

    /// Returns every request received so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.borrow().requests.clone()
    }
}

impl BackendApi for MemoryBackendApi {
    fn send<'a>(&'a self, request: ApiRequest) -> ApiFuture<'a, Result<ApiResponse, ApiError>> {
        Box::pin(async move {
            let mut inner = self.inner.borrow_mut();
            let key = (request.method, request.path.clone());
            let aborted = request.is_aborted();
            inner.requests.push(request);
            if aborted {
                return Err(ApiError::Aborted);
            }
            inner.routes.get(&key).cloned().unwrap_or_else(|| {
                Ok(ApiResponse {
                    status: 404,
                    body: Value::Null,
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn get_json_returns_body_on_success() {
        let api = MemoryBackendApi::default();
        api.respond(ApiMethod::Get, "/api/shares", 200, json!([{ "name": "media" }]));

        let body = block_on(get_json(&api, "/api/shares")).expect("shares");
        assert_eq!(body, json!([{ "name": "media" }]));
        assert_eq!(api.requests(), vec![ApiRequest::get("/api/shares")]);
    }

    #[test]
    fn non_success_status_uses_backend_error_text() {
        let api = MemoryBackendApi::default();
        api.respond(
            ApiMethod::Get,
            "/api/storage-pools",
            503,
            json!({ "error": "zfs daemon offline" }),
        );

        let err = block_on(get_json(&api, "/api/storage-pools")).expect_err("503");
        assert_eq!(
            err,
            ApiError::Status {
                status: 503,
                message: "zfs daemon offline".to_string()
            }
        );
    }

    #[test]
    fn unrouted_requests_are_not_found() {
        let api = MemoryBackendApi::default();
        let err = block_on(get_json(&api, "/api/nothing")).expect_err("404");
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[test]
    fn send_json_treats_success_false_as_rejection() {
        let api = MemoryBackendApi::default();
        api.respond(
            ApiMethod::Post,
            "/api/packages/install",
            200,
            json!({ "success": false, "error": "package not found" }),
        );

        let err = block_on(send_json(
            &api,
            ApiMethod::Post,
            "/api/packages/install",
            json!({ "name": "firefox" }),
        ))
        .expect_err("rejected");
        assert_eq!(err, ApiError::Rejected("package not found".to_string()));
    }

    #[test]
    fn delete_json_sends_no_body() {
        let api = MemoryBackendApi::default();
        api.respond(
            ApiMethod::Delete,
            "/api/shares/7",
            200,
            json!({ "success": true }),
        );

        block_on(delete_json(&api, "/api/shares/7")).expect("deleted");
        let requests = api.requests();
        assert_eq!(requests[0].method, ApiMethod::Delete);
        assert_eq!(requests[0].body, None);
    }

    #[test]
    fn send_json_passes_through_updated_resources() {
        let api = MemoryBackendApi::default();
        api.respond(
            ApiMethod::Put,
            "/api/power-management/rules/3",
            200,
            json!({ "id": 3, "enabled": true }),
        );

        let body = block_on(send_json(
            &api,
            ApiMethod::Put,
            "/api/power-management/rules/3",
            json!({ "enabled": true }),
        ))
        .expect("updated");
        assert_eq!(body["enabled"], json!(true));
    }

    #[test]
    fn scripted_transport_failures_surface_unchanged() {
        let api = MemoryBackendApi::default();
        api.fail(ApiMethod::Get, "/api/containers", ApiError::TimedOut);
        let err = block_on(get_json(&api, "/api/containers")).expect_err("timeout");
        assert_eq!(err, ApiError::TimedOut);
    }

    #[test]
    fn aborted_requests_fail_without_reaching_a_route() {
        let api = MemoryBackendApi::default();
        api.respond(ApiMethod::Get, "/api/containers", 200, json!([]));
        let handle = AbortHandle::default();
        handle.abort();

        let request = ApiRequest::get("/api/containers").abort_with(Some(&handle));
        let err = block_on(get_json_request(&api, request)).expect_err("aborted");
        assert_eq!(err, ApiError::Aborted);
        assert_eq!(api.requests().len(), 1);
    }

    #[test]
    fn abort_runs_listeners_once() {
        let handle = AbortHandle::default();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        handle.on_abort(move || counter.set(counter.get() + 1));

        handle.abort();
        handle.abort();
        assert_eq!(fired.get(), 1);
        assert!(handle.clone().is_aborted());

        let late = Rc::clone(&fired);
        handle.on_abort(move || late.set(late.get() + 10));
        assert_eq!(fired.get(), 11);
    }

    #[test]
    fn noop_backend_is_unavailable() {
        let err = block_on(get_json(&NoopBackendApi, "/api/shares")).expect_err("noop");
        assert_eq!(err, ApiError::Unavailable);
    }
}
