//! Engine binding trait
//!
//! The emulation engine is an opaque native core. The session controller only
//! ever talks to it through [`EngineBinding`], which is injected at
//! construction so tests (and the CLI simulator) can substitute a fake.

use crate::surface::SurfaceHandle;

/// Commands and queries the session controller issues to the emulation engine.
///
/// Every method except [`run`](EngineBinding::run) must return promptly: the
/// controller calls them while holding its state lock. The engine is
/// responsible for synchronizing these signals against its own run loop.
pub trait EngineBinding: Send + Sync + 'static {
    /// Run the content at `game_path`. Blocks until the engine stops.
    ///
    /// Only ever called on the dedicated execution thread.
    fn run(&self, game_path: &str);

    /// Hand the engine a new (or resized) drawable surface.
    fn notify_surface_changed(&self, surface: &SurfaceHandle);

    /// Tell the engine to release its surface reference.
    fn notify_surface_lost(&self);

    /// Pause emulation in place.
    fn pause(&self);

    /// Resume emulation after a pause.
    fn resume(&self);

    /// Request the run loop to exit. Advisory; does not wait.
    fn stop(&self);

    /// Whether the engine believes its run loop is active.
    ///
    /// Used to resynchronize after a UI recreation.
    fn is_engine_running(&self) -> bool;

    /// Advance one display refresh. Driven by the frame pacer, not the controller.
    fn do_frame(&self);
}
