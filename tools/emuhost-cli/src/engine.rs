//! Simulated engine
//!
//! Stands in for the native core: `run` parks the calling thread until `stop`,
//! frames only advance while running, unpaused and holding a surface.

use std::sync::{Condvar, Mutex, MutexGuard};

use emuhost_core::{EngineBinding, SurfaceHandle};
use tracing::{info, trace};

#[derive(Default)]
struct SimState {
    running: bool,
    paused: bool,
    stop_requested: bool,
    surface: Option<SurfaceHandle>,
    frames: u64,
}

#[derive(Default)]
pub struct SimulatedEngine {
    state: Mutex<SimState>,
    cvar: Condvar,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.lock().frames
    }

    pub fn surface(&self) -> Option<SurfaceHandle> {
        self.lock().surface
    }
}

impl EngineBinding for SimulatedEngine {
    fn run(&self, game_path: &str) {
        let mut state = self.lock();
        info!(target: "engine", "run loop entered for '{}'", game_path);
        state.running = true;
        state.paused = false;

        while !state.stop_requested {
            state = self.cvar.wait(state).unwrap_or_else(|e| e.into_inner());
        }

        state.stop_requested = false;
        state.running = false;
        state.surface = None;
        info!(target: "engine", "run loop exited for '{}'", game_path);
    }

    fn notify_surface_changed(&self, surface: &SurfaceHandle) {
        info!(target: "engine", "surface changed: {}", surface);
        self.lock().surface = Some(*surface);
    }

    fn notify_surface_lost(&self) {
        info!(target: "engine", "surface released");
        self.lock().surface = None;
    }

    fn pause(&self) {
        info!(target: "engine", "paused");
        self.lock().paused = true;
    }

    fn resume(&self) {
        info!(target: "engine", "resumed");
        self.lock().paused = false;
    }

    fn stop(&self) {
        info!(target: "engine", "stop requested");
        self.lock().stop_requested = true;
        self.cvar.notify_all();
    }

    fn is_engine_running(&self) -> bool {
        self.lock().running
    }

    fn do_frame(&self) {
        let mut state = self.lock();
        if state.running && !state.paused && state.surface.is_some() {
            state.frames += 1;
            trace!(target: "engine", "frame {}", state.frames);
        }
    }
}
