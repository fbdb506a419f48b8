//! Load state for data fetched from the backend.
//!
//! Panels share one failure policy: a failed load shows `Failed to load <title>` until the user
//! refreshes. Requests are numbered; only the most recently issued one may settle the state, so
//! a slow response from an earlier refresh can never overwrite a newer one. Starting a request
//! also aborts the one it supersedes.

use platform_host::AbortHandle;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResourceState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    /// Display text for the failure.
    Failed(String),
}

impl<T> ResourceState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Identifies one issued request and carries its abort handle.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTicket {
    generation: u64,
    abort: AbortHandle,
}

impl RequestTicket {
    /// Handle to bind to the backend request.
    pub fn abort_handle(&self) -> &AbortHandle {
        &self.abort
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceTracker<T> {
    title: String,
    generation: u64,
    in_flight: Option<AbortHandle>,
    state: ResourceState<T>,
}

impl<T> ResourceTracker<T> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            generation: 0,
            in_flight: None,
            state: ResourceState::Idle,
        }
    }

    pub fn state(&self) -> &ResourceState<T> {
        &self.state
    }

    /// Starts a new request, aborting any in flight.
    pub fn begin(&mut self) -> RequestTicket {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        self.state = ResourceState::Loading;
        let abort = AbortHandle::default();
        self.in_flight = Some(abort.clone());
        RequestTicket {
            generation: self.generation,
            abort,
        }
    }

    /// Aborts the in-flight request, if any. Its result will be ignored.
    pub fn cancel(&self) {
        if let Some(abort) = &self.in_flight {
            abort.abort();
        }
    }

    /// Settles the request identified by `ticket`.
    ///
    /// Returns `false` and leaves the state untouched when a newer request has been issued.
    pub fn finish<E: std::fmt::Display>(
        &mut self,
        ticket: RequestTicket,
        result: Result<T, E>,
    ) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.in_flight = None;
        self.state = match result {
            Ok(value) => ResourceState::Ready(value),
            Err(err) => {
                leptos::logging::warn!("failed to load {}: {err}", self.title);
                ResourceState::Failed(failure_text(&self.title))
            }
        };
        true
    }
}

pub fn failure_text(title: &str) -> String {
    format!("Failed to load {title}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn failure_renders_load_message() {
        let mut tracker = ResourceTracker::<Vec<u32>>::new("Shares");
        let ticket = tracker.begin();
        assert!(tracker.state().is_loading());
        assert!(tracker.finish(ticket, Err::<Vec<u32>, _>("HTTP 500")));
        assert_eq!(tracker.state().error(), Some("Failed to load Shares"));
    }

    #[test]
    fn last_issued_request_wins() {
        let mut tracker = ResourceTracker::<&str>::new("Pools");
        let first = tracker.begin();
        let second = tracker.begin();

        assert!(tracker.finish(second, Ok::<_, String>("fresh")));
        assert!(!tracker.finish(first, Ok::<_, String>("stale")));
        assert_eq!(tracker.state(), &ResourceState::Ready("fresh"));
    }

    #[test]
    fn newer_request_aborts_the_superseded_one() {
        let mut tracker = ResourceTracker::<u8>::new("Containers");
        let first = tracker.begin();
        assert!(!first.abort_handle().is_aborted());

        let second = tracker.begin();
        assert!(first.abort_handle().is_aborted());
        assert!(!second.abort_handle().is_aborted());
    }

    #[test]
    fn cancel_aborts_only_unsettled_requests() {
        let mut tracker = ResourceTracker::<u8>::new("Containers");
        let settled = tracker.begin();
        assert!(tracker.finish(settled.clone(), Ok::<_, String>(1)));
        tracker.cancel();
        assert!(!settled.abort_handle().is_aborted());

        let pending = tracker.begin();
        tracker.cancel();
        assert!(pending.abort_handle().is_aborted());
    }

    #[test]
    fn stale_failure_does_not_clobber_loading_state() {
        let mut tracker = ResourceTracker::<u8>::new("Power");
        let first = tracker.begin();
        let _second = tracker.begin();
        assert!(!tracker.finish(first, Err::<u8, _>("timeout")));
        assert!(tracker.state().is_loading());
    }
}
