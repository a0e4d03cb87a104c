//! Emulation session lifecycle
//!
//! Provides [`SessionController`], the state machine that serializes UI
//! lifecycle events, host surface callbacks and engine commands for one
//! hosted emulation.

mod controller;
mod types;


pub use controller::SessionController;
pub use types::{EmulationState, SessionEvent, SessionSnapshot};
