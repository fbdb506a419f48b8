//! Typed host-domain contracts shared by the desktop runtime and its browser adapters.
//!
//! This crate is the API-first boundary for platform services: lightweight preference storage
//! and the JSON-over-HTTP backend transport every management panel talks through. Concrete
//! browser adapters live in `platform_host_web`; the in-memory adapters here back unit tests and
//! non-browser targets.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod host;
pub mod storage;

pub use api::{
    delete_json, get_json, get_json_request, send_json, AbortHandle, ApiError, ApiFuture,
    ApiMethod, ApiRequest, ApiResponse, BackendApi, MemoryBackendApi, MutationReply,
    NoopBackendApi,
};
pub use host::{HostServices, HostStrategy};
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsStore, PrefsStoreFuture,
};
