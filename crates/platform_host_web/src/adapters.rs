use std::rc::Rc;

use platform_host::{HostServices, HostStrategy, MemoryBackendApi, MemoryPrefsStore};

use crate::{WebBackendApi, WebPrefsStore};

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "memory-host")]
    {
        HostStrategy::Memory
    }

    #[cfg(not(feature = "memory-host"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    selected_host_strategy().as_str()
}

/// Assembles the host service bundle for the selected strategy.
///
/// `api_base_url` is prepended to every backend path; an empty string targets the page origin.
pub fn build_host_services(api_base_url: &str) -> HostServices {
    match selected_host_strategy() {
        HostStrategy::Browser => HostServices {
            prefs: Rc::new(WebPrefsStore),
            api: Rc::new(WebBackendApi::new(api_base_url)),
            host_strategy: HostStrategy::Browser,
        },
        HostStrategy::Memory => {
            HostServices::memory(MemoryPrefsStore::default(), MemoryBackendApi::default())
        }
    }
}
