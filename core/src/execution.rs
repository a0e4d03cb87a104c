//! Background execution thread
//!
//! The engine's `run` entry point blocks for the whole emulation. It is
//! executed on a dedicated named thread; the controller keeps the join handle
//! only to tell whether that thread is still alive. It never joins it.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::engine::EngineBinding;
use crate::error::HostError;

/// Handle to the thread running the engine's blocking loop.
pub struct ExecutionThread {
    handle: JoinHandle<()>,
}

impl ExecutionThread {
    /// Spawn a thread named `name` that calls `engine.run(game_path)`, then
    /// `on_exit` once the run loop has returned.
    ///
    /// Returns as soon as the thread exists; the run loop starts asynchronously.
    pub fn spawn<E, F>(
        name: &str,
        engine: Arc<E>,
        game_path: Arc<str>,
        on_exit: F,
    ) -> Result<Self, HostError>
    where
        E: EngineBinding,
        F: FnOnce() + Send + 'static,
    {
        // `Builder::name` panics on interior NUL instead of failing the spawn
        if name.contains('\0') {
            return Err(HostError::ThreadSpawn {
                name: name.escape_default().to_string(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "thread name contains a NUL byte",
                ),
            });
        }

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!("Starting emulation thread for '{}'", game_path);
                engine.run(&game_path);
                info!("Emulation run loop for '{}' returned", game_path);
                on_exit();
            })
            .map_err(|source| HostError::ThreadSpawn {
                name: name.to_string(),
                source,
            })?;

        Ok(Self { handle })
    }

    /// Whether the run loop has not yet returned.
    pub fn is_alive(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn name(&self) -> Option<&str> {
        self.handle.thread().name()
    }

    /// Whether the caller is this execution thread.
    pub fn is_current(&self) -> bool {
        self.handle.thread().id() == thread::current().id()
    }
}
