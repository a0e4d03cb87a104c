//! Emuhost Core - Emulation session lifecycle for hosted engines
//!
//! This crate keeps one emulation session consistent while three independent
//! sources poke at it: the host UI lifecycle, the host's surface callbacks,
//! and the background thread running the engine's blocking main loop.
//!
//! # Architecture
//!
//! - [`EngineBinding`] - Trait over the opaque native engine
//! - [`SessionController`] - Lock-serialized stopped/running/paused state machine
//! - [`ExecutionThread`] - Named thread running the engine's blocking `run`
//! - [`HostAdapter`] - Forwards UI and surface callbacks into a shared session
//! - [`IntervalFramePacer`] - Drives `do_frame` while the UI is resumed

pub mod config;
pub mod engine;
pub mod error;
pub mod execution;
pub mod host;
#[cfg(test)]
mod integration;
pub mod pacing;
pub mod session;
pub mod surface;
#[cfg(test)]
pub mod test_utils;

pub use config::{Config, LogConfig, MenuSettings, PacingConfig, SessionConfig};
pub use engine::EngineBinding;
pub use error::HostError;
pub use execution::ExecutionThread;
pub use host::{HostAdapter, ReadyStorage, StorageGate, StorageState};
pub use pacing::{FrameCallbackSource, IntervalFramePacer};
pub use session::{EmulationState, SessionController, SessionEvent, SessionSnapshot};
pub use surface::{SurfaceEvent, SurfaceHandle, SurfaceId};
