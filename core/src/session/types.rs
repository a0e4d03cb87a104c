//! Core types for emulation sessions

use std::fmt;

use crate::surface::SurfaceHandle;

// ============================================================================
// Emulation State
// ============================================================================

/// Lifecycle state of the emulation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmulationState {
    /// No run loop has been started (or it was told to stop)
    #[default]
    Stopped,
    /// Engine is running with a live surface
    Running,
    /// Engine is parked and holds no surface
    Paused,
}

impl EmulationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for EmulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Session Events
// ============================================================================

/// Diagnostics emitted by the controller.
///
/// Every event is also logged. None of them is a failure: the call that
/// produced it has already been handled (usually by ignoring it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// UI was recreated while the engine kept running; local state adopted `Paused`
    Resynchronized,
    /// Run requested while already running
    AlreadyRunning,
    /// Pause requested while not running
    PauseIgnored { state: EmulationState },
    /// Stop requested while already stopped
    StopIgnored,
    /// Host delivered a second surface-destroyed callback
    DuplicateSurfaceLoss,
    /// Surface went away while the engine was not rendering
    SurfaceLostWhileIdle { state: EmulationState },
    /// A previous run loop has not exited yet; the start stays latched
    ExecutionBusy,
    /// The execution thread could not be created
    SpawnFailed { reason: String },
}

impl SessionEvent {
    /// Whether this event points at a caller or host bug rather than an
    /// expected race.
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRunning
                | Self::SurfaceLostWhileIdle {
                    state: EmulationState::Paused
                }
                | Self::SpawnFailed { .. }
        )
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resynchronized => write!(f, "engine still running after UI recreation"),
            Self::AlreadyRunning => write!(f, "run called while already running"),
            Self::PauseIgnored { state } => write!(f, "pause called while {}", state),
            Self::StopIgnored => write!(f, "stop called while already stopped"),
            Self::DuplicateSurfaceLoss => write!(f, "surface cleared but already absent"),
            Self::SurfaceLostWhileIdle { state } => {
                write!(f, "surface cleared while emulation {}", state)
            }
            Self::ExecutionBusy => write!(f, "previous emulation thread still alive"),
            Self::SpawnFailed { reason } => write!(f, "emulation thread spawn failed: {}", reason),
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Consistent view of the session taken under its lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: EmulationState,
    pub surface: Option<SurfaceHandle>,
    pub pending_run: bool,
    /// An execution thread spawned by this session has not exited yet
    pub execution_alive: bool,
    /// Number of execution threads spawned over the session's lifetime
    pub launches: u64,
}
