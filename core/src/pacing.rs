//! Frame pacing
//!
//! The engine expects `do_frame` once per display refresh while the host UI is
//! resumed. Hosts with a native vsync callback implement
//! [`FrameCallbackSource`] over it; [`IntervalFramePacer`] is a portable
//! fallback that ticks on its own thread.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::PacingConfig;
use crate::engine::EngineBinding;
use crate::error::HostError;

/// Highest refresh rate honoured; faster rates are treated as this one.
pub const MAX_REFRESH_RATE: u32 = 1000;

/// A per-frame callback registration the host can switch on and off.
pub trait FrameCallbackSource: Send {
    /// Begin delivering frames. Starting an active source is a no-op.
    fn start(&mut self) -> Result<(), HostError>;

    /// Stop delivering frames. Stopping an inactive source is a no-op.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

struct PacerWorker {
    /// Dropping or sending on this ends the loop
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Calls `engine.do_frame()` at a fixed refresh rate on a dedicated thread.
pub struct IntervalFramePacer<E: EngineBinding> {
    engine: Arc<E>,
    enabled: bool,
    frame_duration: Duration,
    worker: Option<PacerWorker>,
}

impl<E: EngineBinding> IntervalFramePacer<E> {
    pub fn new(engine: Arc<E>, refresh_rate: u32) -> Self {
        let refresh_rate = refresh_rate.clamp(1, MAX_REFRESH_RATE);
        Self {
            engine,
            enabled: true,
            frame_duration: Duration::from_nanos(1_000_000_000 / refresh_rate as u64),
            worker: None,
        }
    }

    pub fn from_config(engine: Arc<E>, config: &PacingConfig) -> Self {
        let mut pacer = Self::new(engine, config.refresh_rate);
        pacer.enabled = config.enabled;
        pacer
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }
}

impl<E: EngineBinding> FrameCallbackSource for IntervalFramePacer<E> {
    fn start(&mut self) -> Result<(), HostError> {
        if !self.enabled {
            debug!("Frame pacing disabled; not starting");
            return Ok(());
        }
        if self.worker.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let engine = self.engine.clone();
        let frame_duration = self.frame_duration;

        let handle = thread::Builder::new()
            .name("frame-pacer".into())
            .spawn(move || {
                debug!("Frame pacer started ({:?} per frame)", frame_duration);
                let mut next_frame = Instant::now() + frame_duration;
                loop {
                    let wait = next_frame.saturating_duration_since(Instant::now());
                    match stop_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {
                            engine.do_frame();
                            next_frame += frame_duration;
                            // Fell behind (slow frame or suspended process): don't burst
                            let now = Instant::now();
                            if next_frame < now {
                                next_frame = now + frame_duration;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("Frame pacer finished");
            })
            .map_err(|source| HostError::ThreadSpawn {
                name: "frame-pacer".to_string(),
                source,
            })?;

        self.worker = Some(PacerWorker { stop_tx, handle });
        Ok(())
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = worker.stop_tx.send(());
        if worker.handle.join().is_err() {
            warn!("Frame pacer thread panicked");
        }
    }

    fn is_active(&self) -> bool {
        self.worker.is_some()
    }
}

impl<E: EngineBinding> Drop for IntervalFramePacer<E> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingEngine;

    #[test]
    fn test_frame_duration_from_refresh_rate() {
        let engine = Arc::new(RecordingEngine::new());
        let pacer = IntervalFramePacer::new(engine.clone(), 50);
        assert_eq!(pacer.frame_duration(), Duration::from_millis(20));

        // Zero is clamped instead of dividing by zero
        let pacer = IntervalFramePacer::new(engine.clone(), 0);
        assert_eq!(pacer.frame_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_absurd_refresh_rate_never_spins() {
        let engine = Arc::new(RecordingEngine::new());
        for rate in [MAX_REFRESH_RATE + 1, 2_000_000_000, u32::MAX] {
            let pacer = IntervalFramePacer::new(engine.clone(), rate);
            assert_eq!(pacer.frame_duration(), Duration::from_millis(1));
        }
    }

    #[test]
    fn test_pacer_delivers_frames_until_stopped() {
        let engine = Arc::new(RecordingEngine::new());
        let mut pacer = IntervalFramePacer::new(engine.clone(), 500);

        pacer.start().unwrap();
        assert!(pacer.is_active());
        assert!(engine.wait_for_frames(3, Duration::from_secs(2)));

        pacer.stop();
        assert!(!pacer.is_active());
        let after_stop = engine.frames();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(engine.frames(), after_stop);
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let engine = Arc::new(RecordingEngine::new());
        let mut pacer = IntervalFramePacer::new(engine, 240);

        pacer.stop();
        assert!(!pacer.is_active());

        pacer.start().unwrap();
        pacer.start().unwrap();
        assert!(pacer.is_active());

        pacer.stop();
        pacer.stop();
        assert!(!pacer.is_active());
    }

    #[test]
    fn test_disabled_pacer_never_starts() {
        let engine = Arc::new(RecordingEngine::new());
        let config = PacingConfig {
            enabled: false,
            refresh_rate: 500,
        };
        let mut pacer = IntervalFramePacer::from_config(engine.clone(), &config);

        pacer.start().unwrap();
        assert!(!pacer.is_active());
        thread::sleep(Duration::from_millis(20));
        assert_eq!(engine.frames(), 0);
    }
}
