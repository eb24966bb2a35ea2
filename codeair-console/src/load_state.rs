//! Per-dependency load slots with request supersession.
//!
//! Every [`LoadSlot::begin`] issues a [`Ticket`] carrying a process-wide
//! request id. A completion is applied only when its ticket is still the
//! slot's current one; anything else is a stale result and is dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Shown when a failure carries no message.
pub const FALLBACK_MESSAGE: &str = "Request failed";

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identity of one in-flight load: request id plus the identifying input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub request_id: u64,
    pub key: String,
}

impl Ticket {
    /// Fresh ticket not tied to any slot.
    pub fn issue(key: impl Into<String>) -> Self {
        Self {
            request_id: next_request_id(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Idle
    }
}

impl<T> LoadState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, LoadState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Idle | LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadSlot<T> {
    state: LoadState<T>,
    ticket: Option<Ticket>,
}

impl<T> Default for LoadSlot<T> {
    fn default() -> Self {
        Self {
            state: LoadState::Idle,
            ticket: None,
        }
    }
}

impl<T> LoadSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.ticket.as_ref()
    }

    /// Start a load for `key`, superseding any load in flight.
    pub fn begin(&mut self, key: impl Into<String>) -> Ticket {
        let ticket = Ticket::issue(key);
        self.state = LoadState::Loading;
        self.ticket = Some(ticket.clone());
        ticket
    }

    /// Take over a load issued by an earlier owner of this slot.
    pub fn adopt(&mut self, ticket: Ticket) {
        self.state = LoadState::Loading;
        self.ticket = Some(ticket);
    }

    /// Apply a completion. Returns `false` when the ticket is stale.
    pub fn resolve(&mut self, ticket: &Ticket, result: Result<T, String>) -> bool {
        if self.ticket.as_ref() != Some(ticket) {
            tracing::debug!(
                request_id = ticket.request_id,
                key = %ticket.key,
                "Discarding superseded load result"
            );
            return false;
        }
        self.state = match result {
            Ok(value) => LoadState::Loaded(value),
            Err(message) if message.trim().is_empty() => {
                LoadState::Failed(FALLBACK_MESSAGE.to_string())
            }
            Err(message) => LoadState::Failed(message),
        };
        true
    }

    /// Fail without a request, e.g. when required input is missing.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = LoadState::Failed(message.into());
        self.ticket = None;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// Back to Idle; any in-flight result becomes stale.
    pub fn reset(&mut self) {
        self.state = LoadState::Idle;
        self.ticket = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut slot: LoadSlot<u32> = LoadSlot::new();
        assert!(slot.is_idle());
        let ticket = slot.begin("a");
        assert_eq!(slot.state(), &LoadState::Loading);
        assert!(slot.resolve(&ticket, Ok(5)));
        assert_eq!(slot.state().loaded(), Some(&5));
    }

    #[test]
    fn test_superseded_result_is_ignored() {
        let mut slot: LoadSlot<&str> = LoadSlot::new();
        let first = slot.begin("foo");
        let second = slot.begin("bar");
        assert!(second.request_id > first.request_id);

        assert!(slot.resolve(&second, Ok("bar results")));
        assert!(!slot.resolve(&first, Ok("foo results")));
        assert_eq!(slot.state().loaded(), Some(&"bar results"));
    }

    #[test]
    fn test_same_key_new_request_supersedes() {
        let mut slot: LoadSlot<u8> = LoadSlot::new();
        let first = slot.begin("same");
        let second = slot.begin("same");
        assert!(!slot.resolve(&first, Ok(1)));
        assert!(slot.resolve(&second, Ok(2)));
    }

    #[test]
    fn test_empty_failure_uses_fallback() {
        let mut slot: LoadSlot<()> = LoadSlot::new();
        let ticket = slot.begin("k");
        slot.resolve(&ticket, Err(String::new()));
        assert_eq!(slot.state().error(), Some(FALLBACK_MESSAGE));
    }

    #[test]
    fn test_reset_makes_in_flight_stale() {
        let mut slot: LoadSlot<u8> = LoadSlot::new();
        let ticket = slot.begin("k");
        slot.reset();
        assert!(!slot.resolve(&ticket, Ok(1)));
        assert!(slot.is_idle());
    }
}
