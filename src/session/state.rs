//! Explicit recording lifecycle state
//!
//! The lifecycle is a tagged state value with enforced legal transitions,
//! not a scatter of booleans. `StateCell` is an atomic word so the pump,
//! ticker, and teardown paths can all observe it without locking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Starting,
    Recording,
    Stopping,
}

impl SessionState {
    fn from_u8(value: u8) -> SessionState {
        match value {
            1 => SessionState::Starting,
            2 => SessionState::Recording,
            3 => SessionState::Stopping,
            _ => SessionState::Idle,
        }
    }

    /// Legal lifecycle transitions; everything else is rejected
    fn is_legal(from: SessionState, to: SessionState) -> bool {
        matches!(
            (from, to),
            (SessionState::Idle, SessionState::Starting)
                | (SessionState::Starting, SessionState::Recording)
                | (SessionState::Starting, SessionState::Idle)
                | (SessionState::Recording, SessionState::Stopping)
                | (SessionState::Stopping, SessionState::Idle)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Starting => "starting",
            SessionState::Recording => "recording",
            SessionState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Atomic holder for the current lifecycle state
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(SessionState::Idle as u8))
    }

    pub fn current(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub fn is(&self, state: SessionState) -> bool {
        self.current() == state
    }

    /// Attempt a transition; returns false if it is illegal or the state
    /// has moved on (compare-and-swap), making racing callers lose cleanly.
    pub fn transition(&self, from: SessionState, to: SessionState) -> bool {
        if !SessionState::is_legal(from, to) {
            return false;
        }
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let cell = StateCell::new();
        assert_eq!(cell.current(), SessionState::Idle);
    }

    #[test]
    fn test_full_lifecycle_roundtrip() {
        let cell = StateCell::new();
        assert!(cell.transition(SessionState::Idle, SessionState::Starting));
        assert!(cell.transition(SessionState::Starting, SessionState::Recording));
        assert!(cell.transition(SessionState::Recording, SessionState::Stopping));
        assert!(cell.transition(SessionState::Stopping, SessionState::Idle));
        assert_eq!(cell.current(), SessionState::Idle);
    }

    #[test]
    fn test_acquisition_failure_rolls_back() {
        let cell = StateCell::new();
        assert!(cell.transition(SessionState::Idle, SessionState::Starting));
        assert!(cell.transition(SessionState::Starting, SessionState::Idle));
        assert_eq!(cell.current(), SessionState::Idle);
    }

    #[test]
    fn test_second_start_is_rejected() {
        let cell = StateCell::new();
        assert!(cell.transition(SessionState::Idle, SessionState::Starting));
        assert!(!cell.transition(SessionState::Idle, SessionState::Starting));
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let cell = StateCell::new();
        // Cannot jump straight to recording or stop from idle
        assert!(!cell.transition(SessionState::Idle, SessionState::Recording));
        assert!(!cell.transition(SessionState::Idle, SessionState::Stopping));
        // A stale CAS loses even when the pair itself is legal
        assert!(!cell.transition(SessionState::Recording, SessionState::Stopping));
    }
}
