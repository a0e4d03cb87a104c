//! Session lifecycle controller
//!
//! All state lives in one mutex-guarded struct. Each public method takes the
//! lock for its whole duration, so surface callbacks, UI lifecycle calls and
//! queries never interleave. Engine commands are issued under the lock; they
//! are required to be non-blocking. The blocking `run` entry point only ever
//! executes on the spawned [`ExecutionThread`].
//!
//! When that thread's run loop returns it re-enters the session through a
//! weak reference, so a start that was latched while the old loop was still
//! exiting goes through without another host callback.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, error, warn};

use crate::config::SessionConfig;
use crate::engine::EngineBinding;
use crate::execution::ExecutionThread;
use crate::surface::SurfaceHandle;

use super::types::{EmulationState, SessionEvent, SessionSnapshot};

struct SessionInner {
    state: EmulationState,
    surface: Option<SurfaceHandle>,
    /// Run requested with no surface available; start once one arrives
    pending_run: bool,
    execution: Option<ExecutionThread>,
    launches: u64,
    events: VecDeque<SessionEvent>,
}

/// Thread-safe emulation session.
///
/// Share it as `Arc<SessionController<E>>` between the host UI and its surface
/// callbacks. The controller outlives any single UI instance: a recreated UI
/// is handed the same `Arc` and finds the session exactly as it was left.
pub struct SessionController<E: EngineBinding> {
    shared: Arc<SessionShared<E>>,
}

/// Everything the execution thread needs to finish a latched start.
struct SessionShared<E: EngineBinding> {
    game_path: Arc<str>,
    engine: Arc<E>,
    config: SessionConfig,
    inner: Mutex<SessionInner>,
}

impl<E: EngineBinding> SessionController<E> {
    /// Create a stopped session for `game_path` with default settings.
    pub fn new(game_path: impl Into<String>, engine: Arc<E>) -> Self {
        Self::with_config(game_path, engine, SessionConfig::default())
    }

    pub fn with_config(game_path: impl Into<String>, engine: Arc<E>, config: SessionConfig) -> Self {
        let game_path: Arc<str> = Arc::from(game_path.into());
        debug!("Created emulation session for '{}'", game_path);

        Self {
            shared: Arc::new(SessionShared {
                game_path,
                engine,
                config,
                inner: Mutex::new(SessionInner {
                    state: EmulationState::Stopped,
                    surface: None,
                    pending_run: false,
                    execution: None,
                    launches: 0,
                    events: VecDeque::new(),
                }),
            }),
        }
    }

    pub fn game_path(&self) -> &str {
        &self.shared.game_path
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.shared.engine
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.shared.lock()
    }

    fn report(&self, inner: &mut SessionInner, event: SessionEvent) {
        self.shared.report(inner, event);
    }

    // ------------------------------------------------------------------------
    // State queries
    // ------------------------------------------------------------------------

    pub fn state(&self) -> EmulationState {
        self.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.lock().state == EmulationState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.lock().state == EmulationState::Paused
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().state == EmulationState::Stopped
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot {
            state: inner.state,
            surface: inner.surface,
            pending_run: inner.pending_run,
            execution_alive: inner.execution.as_ref().is_some_and(|t| t.is_alive()),
            launches: inner.launches,
        }
    }

    /// Drain the diagnostics recorded since the last call.
    pub fn take_events(&self) -> Vec<SessionEvent> {
        self.lock().events.drain(..).collect()
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Ask for emulation to run, now or as soon as a surface exists.
    ///
    /// `was_ui_recreated` is set when the host rebuilt its UI. If the engine
    /// kept running across that, the session adopts `Paused` so the next
    /// transition resumes it in place instead of starting a second run loop.
    pub fn request_run(&self, was_ui_recreated: bool) {
        let mut inner = self.lock();

        if was_ui_recreated {
            if self.shared.engine.is_engine_running() {
                debug!("UI recreated with engine still running; adopting paused state");
                inner.state = EmulationState::Paused;
                self.report(&mut inner, SessionEvent::Resynchronized);
            }
        } else {
            debug!("Host resumed or fresh start");
        }

        if inner.surface.is_some() {
            self.shared.run_with_valid_surface(&mut inner);
        } else {
            debug!("No surface yet; run deferred until one is available");
            inner.pending_run = true;
        }
    }

    /// Withdraw a run that is still waiting for a surface.
    pub fn cancel_pending_run(&self) {
        let mut inner = self.lock();
        if inner.pending_run {
            debug!("Withdrawing deferred run");
            inner.pending_run = false;
        }
    }

    /// Pause a running session. The engine releases its surface first.
    pub fn pause(&self) {
        let mut inner = self.lock();

        match inner.state {
            EmulationState::Running => {
                debug!("Pausing emulation");
                // The engine needs to be live to let go of the surface cleanly
                self.shared.engine.notify_surface_lost();
                self.shared.engine.pause();
                inner.state = EmulationState::Paused;
            }
            state => {
                warn!("Pause called while already {}", state);
                self.report(&mut inner, SessionEvent::PauseIgnored { state });
            }
        }
    }

    /// Tell the engine to stop. Returns without waiting for the run loop to exit.
    pub fn stop(&self) {
        let mut inner = self.lock();
        inner.pending_run = false;

        if inner.state == EmulationState::Stopped {
            warn!("Stop called while already stopped");
            self.report(&mut inner, SessionEvent::StopIgnored);
            return;
        }

        debug!("Stopping emulation");
        inner.state = EmulationState::Stopped;
        self.shared.engine.stop();
    }

    // ------------------------------------------------------------------------
    // Surface callbacks
    // ------------------------------------------------------------------------

    /// Host created or resized the surface.
    pub fn on_surface_available(&self, surface: SurfaceHandle) {
        let mut inner = self.lock();
        let previous = inner.surface.replace(surface);
        debug!("Surface changed: {}", surface);

        if inner.pending_run {
            self.shared.run_with_valid_surface(&mut inner);
        } else if inner.state == EmulationState::Running {
            match previous {
                Some(previous) if previous == surface => {}
                Some(previous) if previous.same_surface(&surface) => {
                    debug!("Surface resized to {}x{}", surface.width(), surface.height());
                    self.shared.engine.notify_surface_changed(&surface);
                }
                _ => {
                    debug!("Surface swapped while running");
                    self.shared.engine.notify_surface_changed(&surface);
                }
            }
        }
    }

    /// Host destroyed the surface.
    pub fn on_surface_lost(&self) {
        let mut inner = self.lock();

        if inner.surface.take().is_none() {
            warn!("Surface cleared, but surface already absent");
            self.report(&mut inner, SessionEvent::DuplicateSurfaceLoss);
            return;
        }
        debug!("Surface destroyed");

        match inner.state {
            EmulationState::Running => {
                self.shared.engine.notify_surface_lost();
                inner.state = EmulationState::Paused;
                // Lost to the host, not paused by the user: resume on the next surface
                inner.pending_run = true;
            }
            state => {
                warn!("Surface cleared while emulation {}", state);
                self.report(&mut inner, SessionEvent::SurfaceLostWhileIdle { state });
            }
        }
    }
}

impl<E: EngineBinding> SessionShared<E> {
    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|e| {
            warn!("Session lock poisoned; continuing with last known state");
            e.into_inner()
        })
    }

    fn report(&self, inner: &mut SessionInner, event: SessionEvent) {
        if self.config.event_capacity == 0 {
            return;
        }
        while inner.events.len() >= self.config.event_capacity {
            inner.events.pop_front();
        }
        inner.events.push_back(event);
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Start or resume now that a surface is known. Caller holds the lock.
    fn run_with_valid_surface(self: &Arc<Self>, inner: &mut SessionInner) {
        inner.pending_run = false;

        let Some(surface) = inner.surface else {
            warn!("Run attempted without a surface; deferring");
            inner.pending_run = true;
            return;
        };

        match inner.state {
            EmulationState::Stopped => {
                if inner.execution.as_ref().is_some_and(|t| t.is_alive()) {
                    warn!("Previous emulation thread has not exited; start stays deferred");
                    inner.pending_run = true;
                    self.report(inner, SessionEvent::ExecutionBusy);
                    return;
                }

                self.engine.notify_surface_changed(&surface);
                let session = Arc::downgrade(self);
                match ExecutionThread::spawn(
                    &self.config.execution_thread_name,
                    self.engine.clone(),
                    self.game_path.clone(),
                    move || Self::on_execution_exit(&session),
                ) {
                    Ok(thread) => {
                        inner.execution = Some(thread);
                        inner.launches += 1;
                    }
                    Err(e) => {
                        error!("Could not start emulation: {}", e);
                        self.report(
                            inner,
                            SessionEvent::SpawnFailed {
                                reason: e.to_string(),
                            },
                        );
                        return;
                    }
                }
            }
            EmulationState::Paused => {
                debug!("Resuming emulation");
                self.engine.notify_surface_changed(&surface);
                self.engine.resume();
            }
            EmulationState::Running => {
                warn!("Bug: run called while already running");
                self.report(inner, SessionEvent::AlreadyRunning);
                return;
            }
        }

        inner.state = EmulationState::Running;
    }

    /// Runs on the execution thread once `engine.run` has returned.
    fn on_execution_exit(session: &Weak<Self>) {
        let Some(session) = session.upgrade() else {
            return;
        };
        let mut inner = session.lock();

        if inner.execution.as_ref().is_some_and(|t| t.is_current()) {
            inner.execution = None;
        }

        if inner.state == EmulationState::Stopped && inner.pending_run && inner.surface.is_some() {
            debug!("Previous emulation thread exited; starting deferred run");
            session.run_with_valid_surface(&mut inner);
        }
    }
}
