//! Shared test utilities for unit and integration tests

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::engine::EngineBinding;
use crate::surface::{SurfaceHandle, SurfaceId};

// ============================================================================
// Recording Engine
// ============================================================================

/// One call made on [`RecordingEngine`], in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Run(String),
    SurfaceChanged(SurfaceHandle),
    SurfaceLost,
    Pause,
    Resume,
    Stop,
}

#[derive(Default)]
struct RecordingState {
    calls: Vec<EngineCall>,
    runs_started: usize,
    runs_finished: usize,
    active_runs: usize,
    pending_stops: usize,
    exit_held: bool,
    reports_running: Option<bool>,
    run_threads: Vec<Option<String>>,
    frames: u64,
}

/// Engine test double.
///
/// Records every command. `run` blocks until `stop` is called (unless exit is
/// held), mirroring a native run loop.
#[derive(Default)]
pub struct RecordingEngine {
    state: Mutex<RecordingState>,
    cvar: Condvar,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Every recorded call so far.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn count(&self, call: &EngineCall) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    pub fn run_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, EngineCall::Run(_)))
            .count()
    }

    /// Force the answer of `is_engine_running` (None = follow active runs).
    pub fn set_reports_running(&self, running: Option<bool>) {
        self.lock().reports_running = running;
    }

    /// While held, `run` ignores `stop` and keeps blocking.
    pub fn hold_exit(&self, held: bool) {
        self.lock().exit_held = held;
        self.cvar.notify_all();
    }

    pub fn frames(&self) -> u64 {
        self.lock().frames
    }

    pub fn run_thread_names(&self) -> Vec<Option<String>> {
        self.lock().run_threads.clone()
    }

    /// Wait until at least `n` run loops have started.
    pub fn wait_for_runs(&self, n: usize, timeout: Duration) -> bool {
        self.wait_until(timeout, |s| s.runs_started >= n)
    }

    /// Wait until at least `n` run loops have returned.
    pub fn wait_for_exits(&self, n: usize, timeout: Duration) -> bool {
        self.wait_until(timeout, |s| s.runs_finished >= n)
    }

    /// Wait until at least `n` frames were delivered.
    pub fn wait_for_frames(&self, n: u64, timeout: Duration) -> bool {
        self.wait_until(timeout, |s| s.frames >= n)
    }

    fn wait_until(&self, timeout: Duration, done: impl Fn(&RecordingState) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while !done(&state) {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .cvar
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
        true
    }
}

impl EngineBinding for RecordingEngine {
    fn run(&self, game_path: &str) {
        let mut state = self.lock();
        state.calls.push(EngineCall::Run(game_path.to_string()));
        state
            .run_threads
            .push(std::thread::current().name().map(str::to_string));
        state.runs_started += 1;
        state.active_runs += 1;
        self.cvar.notify_all();

        while state.exit_held || state.pending_stops == 0 {
            state = self.cvar.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        state.pending_stops -= 1;
        state.active_runs -= 1;
        state.runs_finished += 1;
        self.cvar.notify_all();
    }

    fn notify_surface_changed(&self, surface: &SurfaceHandle) {
        self.lock().calls.push(EngineCall::SurfaceChanged(*surface));
    }

    fn notify_surface_lost(&self) {
        self.lock().calls.push(EngineCall::SurfaceLost);
    }

    fn pause(&self) {
        self.lock().calls.push(EngineCall::Pause);
    }

    fn resume(&self) {
        self.lock().calls.push(EngineCall::Resume);
    }

    fn stop(&self) {
        let mut state = self.lock();
        state.calls.push(EngineCall::Stop);
        state.pending_stops += 1;
        self.cvar.notify_all();
    }

    fn is_engine_running(&self) -> bool {
        let state = self.lock();
        state.reports_running.unwrap_or(state.active_runs > 0)
    }

    fn do_frame(&self) {
        let mut state = self.lock();
        state.frames += 1;
        self.cvar.notify_all();
    }
}

/// Convenience constructor for test surfaces.
pub fn surface(id: u64) -> SurfaceHandle {
    SurfaceHandle::new(SurfaceId(id), 1280, 720)
}
