//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! - `storage::local_prefs`: `localStorage`-backed preferences
//! - `api`: `fetch`-backed backend transport with abort-controller timeouts
//! - `dialogs`: blocking `confirm()`/`alert()` prompts used by panel actions
//!
//! Every adapter compiles on native targets too, where it degrades to an inert fallback so the
//! runtime crates can run their unit tests without a browser.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and service-bundle assembly.
pub mod adapters;
pub mod api;
pub mod dialogs;
pub mod storage;

pub use adapters::{build_host_services, host_strategy_name, selected_host_strategy};
pub use api::WebBackendApi;
pub use dialogs::{alert, confirm};
pub use storage::local_prefs::WebPrefsStore;
