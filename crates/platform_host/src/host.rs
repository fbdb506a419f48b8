//! Host service bundle injected into the desktop runtime.

use std::rc::Rc;

use crate::{BackendApi, MemoryBackendApi, MemoryPrefsStore, PrefsStore};

/// Host strategy selected for the current build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser runtime (`localStorage` + `fetch`).
    Browser,
    /// In-memory services for tests and non-browser builds.
    Memory,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Memory => "memory",
        }
    }
}

/// Runtime-selected host services.
///
/// All environment-specific adapter selection happens before this bundle crosses into
/// `desktop_runtime`, which keeps the runtime free of browser API details.
#[derive(Clone)]
pub struct HostServices {
    /// Preference storage.
    pub prefs: Rc<dyn PrefsStore>,
    /// Backend REST transport.
    pub api: Rc<dyn BackendApi>,
    /// Strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

impl HostServices {
    /// Builds a bundle over in-memory adapters.
    pub fn memory(prefs: MemoryPrefsStore, api: MemoryBackendApi) -> Self {
        Self {
            prefs: Rc::new(prefs),
            api: Rc::new(api),
            host_strategy: HostStrategy::Memory,
        }
    }
}
