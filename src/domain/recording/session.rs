//! Recording session state machine

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Recording session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Recording,
    Paused,
    Stopped,
}

impl SessionStatus {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Durable identity of a session, assigned by the checkpoint store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: SessionStatus,
    pub action: String,
}

/// Session state machine.
///
/// ```text
///   IDLE      -> RECORDING (start)
///   RECORDING -> PAUSED    (pause)
///   PAUSED    -> RECORDING (resume)
///   RECORDING -> STOPPED   (stop)
///   PAUSED    -> STOPPED   (stop)
///   any       -> IDLE      (reset)
/// ```
///
/// Only `start` can fail; the other transitions report whether they applied
/// and are no-ops otherwise.
#[derive(Debug, Default)]
pub struct SessionState {
    status: SessionStatus,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_recording(&self) -> bool {
        self.status == SessionStatus::Recording
    }

    /// Recording or paused: the capture device is held
    pub fn is_active(&self) -> bool {
        matches!(self.status, SessionStatus::Recording | SessionStatus::Paused)
    }

    /// Transition from IDLE to RECORDING
    pub fn start(&mut self) -> Result<(), InvalidStateTransition> {
        if self.status != SessionStatus::Idle {
            return Err(InvalidStateTransition {
                current_state: self.status,
                action: "start recording".to_string(),
            });
        }
        self.status = SessionStatus::Recording;
        Ok(())
    }

    pub fn pause(&mut self) -> bool {
        self.transition(SessionStatus::Recording, SessionStatus::Paused)
    }

    pub fn resume(&mut self) -> bool {
        self.transition(SessionStatus::Paused, SessionStatus::Recording)
    }

    pub fn stop(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = SessionStatus::Stopped;
        true
    }

    pub fn reset(&mut self) {
        self.status = SessionStatus::Idle;
    }

    fn transition(&mut self, from: SessionStatus, to: SessionStatus) -> bool {
        if self.status != from {
            return false;
        }
        self.status = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let state = SessionState::new();
        assert_eq!(state.status(), SessionStatus::Idle);
        assert!(!state.is_active());
    }

    #[test]
    fn start_from_idle() {
        let mut state = SessionState::new();
        assert!(state.start().is_ok());
        assert!(state.is_recording());
    }

    #[test]
    fn start_while_recording_fails() {
        let mut state = SessionState::new();
        state.start().unwrap();

        let err = state.start().unwrap_err();
        assert_eq!(err.current_state, SessionStatus::Recording);
        assert!(err.action.contains("start recording"));
    }

    #[test]
    fn pause_and_resume() {
        let mut state = SessionState::new();
        state.start().unwrap();

        assert!(state.pause());
        assert_eq!(state.status(), SessionStatus::Paused);
        assert!(state.is_active());

        assert!(state.resume());
        assert!(state.is_recording());
    }

    #[test]
    fn pause_and_resume_are_noops_elsewhere() {
        let mut state = SessionState::new();
        assert!(!state.pause());
        assert!(!state.resume());

        state.start().unwrap();
        assert!(!state.resume());
        assert!(state.is_recording());
    }

    #[test]
    fn stop_from_recording_or_paused() {
        let mut state = SessionState::new();
        state.start().unwrap();
        assert!(state.stop());
        assert_eq!(state.status(), SessionStatus::Stopped);

        let mut state = SessionState::new();
        state.start().unwrap();
        state.pause();
        assert!(state.stop());
        assert_eq!(state.status(), SessionStatus::Stopped);
    }

    #[test]
    fn stop_from_idle_is_noop() {
        let mut state = SessionState::new();
        assert!(!state.stop());
        assert_eq!(state.status(), SessionStatus::Idle);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut state = SessionState::new();
        state.start().unwrap();
        state.stop();
        state.reset();
        assert_eq!(state.status(), SessionStatus::Idle);
        assert!(state.start().is_ok());
    }

    #[test]
    fn status_display() {
        assert_eq!(SessionStatus::Idle.to_string(), "idle");
        assert_eq!(SessionStatus::Paused.to_string(), "paused");
        assert_eq!(SessionStatus::Stopped.to_string(), "stopped");
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: SessionStatus::Paused,
            action: "start recording".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("start recording"));
        assert!(msg.contains("paused"));
    }
}
