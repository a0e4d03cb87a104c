//! Lifecycle scripts
//!
//! A script is a list of steps applied to one session in order, e.g.
//! `run surface:1:1280x720 lost surface:2:1280x720 stop`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use emuhost_core::{
    Config, FrameCallbackSource, IntervalFramePacer, SessionController, SessionSnapshot,
    SurfaceHandle, SurfaceId,
};

use crate::engine::SimulatedEngine;

/// One lifecycle event fed to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Run,
    RunRecreated,
    Surface(SurfaceHandle),
    Lost,
    Pause,
    Stop,
    /// Let the run loop and frame pacer make progress
    Wait(Duration),
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "run" => return Ok(Step::Run),
            "run-recreated" => return Ok(Step::RunRecreated),
            "lost" => return Ok(Step::Lost),
            "pause" => return Ok(Step::Pause),
            "stop" => return Ok(Step::Stop),
            _ => {}
        }

        if let Some(ms) = s.strip_prefix("wait:") {
            let ms: u64 = ms.parse().with_context(|| format!("bad wait '{}'", s))?;
            return Ok(Step::Wait(Duration::from_millis(ms)));
        }

        if let Some(rest) = s.strip_prefix("surface:") {
            let (id, size) = rest
                .split_once(':')
                .with_context(|| format!("expected surface:<id>:<w>x<h>, got '{}'", s))?;
            let (w, h) = size
                .split_once('x')
                .with_context(|| format!("expected <w>x<h> in '{}'", s))?;
            let id: u64 = id.parse().with_context(|| format!("bad surface id in '{}'", s))?;
            let w: u32 = w.parse().with_context(|| format!("bad width in '{}'", s))?;
            let h: u32 = h.parse().with_context(|| format!("bad height in '{}'", s))?;
            return Ok(Step::Surface(SurfaceHandle::new(SurfaceId(id), w, h)));
        }

        bail!("unknown step '{}'", s)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Run => write!(f, "run"),
            Step::RunRecreated => write!(f, "run-recreated"),
            Step::Surface(handle) => write!(f, "surface {}", handle),
            Step::Lost => write!(f, "lost"),
            Step::Pause => write!(f, "pause"),
            Step::Stop => write!(f, "stop"),
            Step::Wait(d) => write!(f, "wait {}ms", d.as_millis()),
        }
    }
}

pub fn parse_steps<S: AsRef<str>>(steps: &[S]) -> Result<Vec<Step>> {
    steps.iter().map(|s| s.as_ref().parse()).collect()
}

/// The canonical run / lose surface / resume sequence.
pub fn default_scenario() -> Vec<Step> {
    vec![
        Step::Run,
        Step::Surface(SurfaceHandle::new(SurfaceId(1), 1280, 720)),
        Step::Wait(Duration::from_millis(50)),
        Step::Lost,
        Step::Surface(SurfaceHandle::new(SurfaceId(2), 1280, 720)),
        Step::Wait(Duration::from_millis(50)),
    ]
}

/// Session state after one step.
pub struct TrailEntry {
    pub step: Step,
    pub snapshot: SessionSnapshot,
}

impl fmt::Display for TrailEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let surface = self
            .snapshot
            .surface
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{:<28} -> {:<8} surface={} pending={} launches={}",
            self.step.to_string(),
            self.snapshot.state,
            surface,
            self.snapshot.pending_run,
            self.snapshot.launches
        )
    }
}

pub struct ScriptReport {
    pub trail: Vec<TrailEntry>,
    pub events: Vec<String>,
    pub frames: u64,
}

/// Apply `steps` to a fresh session for `game`, then stop it.
pub fn execute(game: &str, steps: &[Step], config: &Config) -> Result<ScriptReport> {
    let engine = Arc::new(SimulatedEngine::new());
    let session = SessionController::with_config(game, engine.clone(), config.session.clone());
    let mut pacer = IntervalFramePacer::from_config(engine.clone(), &config.pacing);
    pacer.start().context("failed to start frame pacing")?;

    let mut trail = Vec::with_capacity(steps.len());
    for step in steps {
        match *step {
            Step::Run => session.request_run(false),
            Step::RunRecreated => session.request_run(true),
            Step::Surface(handle) => session.on_surface_available(handle),
            Step::Lost => session.on_surface_lost(),
            Step::Pause => session.pause(),
            Step::Stop => session.stop(),
            Step::Wait(d) => std::thread::sleep(d),
        }
        trail.push(TrailEntry {
            step: *step,
            snapshot: session.snapshot(),
        });
    }

    pacer.stop();
    if !session.is_stopped() {
        session.stop();
    }

    let events = session
        .take_events()
        .iter()
        .map(|e| {
            let tag = if e.is_anomaly() { "anomaly" } else { "note" };
            format!("[{}] {}", tag, e)
        })
        .collect();

    Ok(ScriptReport {
        trail,
        events,
        frames: engine.frames(),
    })
}

#[cfg(test)]
mod tests {
    use emuhost_core::EmulationState;

    use super::*;

    #[test]
    fn test_parse_simple_steps() {
        let steps = parse_steps(&["run", "run-recreated", "lost", "pause", "stop"]).unwrap();
        assert_eq!(
            steps,
            vec![Step::Run, Step::RunRecreated, Step::Lost, Step::Pause, Step::Stop]
        );
    }

    #[test]
    fn test_parse_surface_and_wait() {
        let steps = parse_steps(&["surface:3:800x600", "wait:25"]).unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Surface(SurfaceHandle::new(SurfaceId(3), 800, 600)),
                Step::Wait(Duration::from_millis(25)),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("jump".parse::<Step>().is_err());
        assert!("surface:1".parse::<Step>().is_err());
        assert!("surface:1:800by600".parse::<Step>().is_err());
        assert!("surface:x:800x600".parse::<Step>().is_err());
        assert!("wait:soon".parse::<Step>().is_err());
    }

    #[test]
    fn test_default_scenario_trail() {
        let report = execute("game.bin", &default_scenario(), &Config::default()).unwrap();
        let states: Vec<_> = report.trail.iter().map(|t| t.snapshot.state).collect();

        assert_eq!(
            states,
            vec![
                EmulationState::Stopped,
                EmulationState::Running,
                EmulationState::Running,
                EmulationState::Paused,
                EmulationState::Running,
                EmulationState::Running,
            ]
        );
        assert!(report.trail[0].snapshot.pending_run);
        assert!(report.trail.iter().all(|t| t.snapshot.launches <= 1));
        assert_eq!(report.trail.last().unwrap().snapshot.launches, 1);
        assert!(report.events.is_empty());
    }

    #[test]
    fn test_misuse_is_reported_not_fatal() {
        let steps = parse_steps(&["pause", "stop", "lost"]).unwrap();
        let report = execute("game.bin", &steps, &Config::default()).unwrap();

        assert_eq!(report.events.len(), 3);
        assert!(report.events.iter().all(|e| e.starts_with("[note]")));
        assert_eq!(report.frames, 0);
    }
}
