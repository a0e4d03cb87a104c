//! Host UI lifecycle adapter
//!
//! Translates the host's UI callbacks (attach, resume, pause, detach, surface
//! created/changed/destroyed) into [`SessionController`] calls, and keeps frame
//! pacing switched on only while the UI is resumed.
//!
//! The adapter is tied to one UI instance. The session is not: when the host
//! recreates its UI it builds a new adapter around the same
//! `Arc<SessionController>` and passes `recreated = true` to
//! [`HostAdapter::on_resume`].

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::engine::EngineBinding;
use crate::pacing::FrameCallbackSource;
use crate::session::SessionController;
use crate::surface::{SurfaceEvent, SurfaceHandle};

/// Outcome of the host's storage/directory initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageState {
    /// Directories exist; emulation may start
    Ready,
    /// The user has not granted storage access
    PermissionNeeded,
    /// External storage is missing or not mounted
    StorageUnavailable,
}

/// Gate that must be open before the first run.
pub trait StorageGate: Send {
    fn is_ready(&self) -> bool;

    /// Kick off initialization. The host reports completion through
    /// [`HostAdapter::on_storage_state`].
    fn begin_initialization(&mut self);
}

/// Gate for hosts without any storage setup.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadyStorage;

impl StorageGate for ReadyStorage {
    fn is_ready(&self) -> bool {
        true
    }

    fn begin_initialization(&mut self) {}
}

/// Per-UI adapter feeding host callbacks into a shared session.
pub struct HostAdapter<E, P, G>
where
    E: EngineBinding,
    P: FrameCallbackSource,
    G: StorageGate,
{
    session: Arc<SessionController<E>>,
    pacer: P,
    storage: G,
    attached: bool,
    resumed: bool,
    /// Resume arrived before storage was ready; holds its `recreated` flag
    awaiting_storage: Option<bool>,
}

impl<E, P, G> HostAdapter<E, P, G>
where
    E: EngineBinding,
    P: FrameCallbackSource,
    G: StorageGate,
{
    pub fn new(session: Arc<SessionController<E>>, pacer: P, storage: G) -> Self {
        Self {
            session,
            pacer,
            storage,
            attached: false,
            resumed: false,
            awaiting_storage: None,
        }
    }

    /// The session this UI drives. Clone it to hand to a recreated UI.
    pub fn session(&self) -> &Arc<SessionController<E>> {
        &self.session
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    pub fn is_awaiting_storage(&self) -> bool {
        self.awaiting_storage.is_some()
    }

    // ------------------------------------------------------------------------
    // UI lifecycle
    // ------------------------------------------------------------------------

    pub fn on_attach(&mut self) {
        debug!("Host UI attached");
        self.attached = true;
    }

    pub fn on_detach(&mut self) {
        debug!("Host UI detached");
        self.attached = false;
    }

    /// UI entered the foreground.
    pub fn on_resume(&mut self, recreated: bool) {
        self.resumed = true;
        if let Err(e) = self.pacer.start() {
            error!("Frame pacing unavailable: {}", e);
        }

        if self.storage.is_ready() {
            self.session.request_run(recreated);
        } else {
            debug!("Storage not ready; run waits for initialization");
            self.awaiting_storage = Some(recreated);
            self.storage.begin_initialization();
        }
    }

    /// UI left the foreground.
    pub fn on_pause(&mut self) {
        self.awaiting_storage = None;

        if self.session.is_running() {
            self.session.pause();
        } else {
            self.session.cancel_pending_run();
        }

        self.pacer.stop();
        self.resumed = false;
    }

    /// Storage initialization progressed.
    pub fn on_storage_state(&mut self, state: StorageState) {
        let Some(recreated) = self.awaiting_storage else {
            debug!("Storage state {:?} with no run waiting", state);
            return;
        };

        match state {
            StorageState::Ready => {
                self.awaiting_storage = None;
                self.session.request_run(recreated);
            }
            StorageState::PermissionNeeded => {
                warn!("Storage permission needed before emulation can start");
            }
            StorageState::StorageUnavailable => {
                warn!("External storage not mounted; emulation cannot start");
            }
        }
    }

    /// User asked to end emulation.
    pub fn stop_emulation(&mut self) {
        self.awaiting_storage = None;
        self.session.stop();
    }

    // ------------------------------------------------------------------------
    // Surface callbacks
    // ------------------------------------------------------------------------

    pub fn on_surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Created => self.on_surface_created(),
            SurfaceEvent::Changed(handle) => self.on_surface_changed(handle),
            SurfaceEvent::Destroyed => self.on_surface_destroyed(),
        }
    }

    /// Nothing to do: a `Changed` callback always follows creation.
    pub fn on_surface_created(&mut self) {}

    pub fn on_surface_changed(&mut self, handle: SurfaceHandle) {
        debug!(
            "Surface changed. Resolution: {}x{}",
            handle.width(),
            handle.height()
        );
        self.session.on_surface_available(handle);
    }

    pub fn on_surface_destroyed(&mut self) {
        self.session.on_surface_lost();
    }
}
