//! The playback engine contract and a deterministic in-process engine.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// A media player the cursor can steer.
///
/// The cursor never assumes a load is instantaneous: while no frame is
/// available, `current_time` returns `None`. The engine's "ended" event is
/// forwarded by the host to `PlaybackCursor::on_ended`.
pub trait PlaybackEngine {
    /// Replace the active source. Loading a source pauses playback.
    fn load(&mut self, source: &Path) -> Result<(), EngineError>;

    fn play(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self) -> Result<(), EngineError>;

    /// Move to a source-relative time.
    fn seek(&mut self, seconds: f64) -> Result<(), EngineError>;

    /// Native source time, or `None` while no frame is available.
    fn current_time(&self) -> Option<f64>;
}

impl<E: PlaybackEngine + ?Sized> PlaybackEngine for Box<E> {
    fn load(&mut self, source: &Path) -> Result<(), EngineError> {
        (**self).load(source)
    }

    fn play(&mut self) -> Result<(), EngineError> {
        (**self).play()
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        (**self).pause()
    }

    fn seek(&mut self, seconds: f64) -> Result<(), EngineError> {
        (**self).seek(seconds)
    }

    fn current_time(&self) -> Option<f64> {
        (**self).current_time()
    }
}

/// A call received by [`SimulatedEngine`], kept for inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(PathBuf),
    Play,
    Pause,
    Seek(f64),
}

/// Clock-driven engine with no real decoding.
///
/// Time only moves when [`SimulatedEngine::advance`] is called, which makes
/// playback fully deterministic for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct SimulatedEngine {
    source: Option<PathBuf>,
    time: f64,
    playing: bool,
    load_latency: u32,
    pending_frames: u32,
    failing: HashSet<PathBuf>,
    calls: Vec<EngineCall>,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report no frame for `frames` calls to `advance` after each load.
    pub fn with_load_latency(mut self, frames: u32) -> Self {
        self.load_latency = frames;
        self
    }

    /// Make every load of `path` fail.
    pub fn fail_loads_of(&mut self, path: impl Into<PathBuf>) {
        self.failing.insert(path.into());
    }

    /// Step the clock by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        if self.pending_frames > 0 {
            self.pending_frames -= 1;
            return;
        }
        if self.playing && self.source.is_some() {
            self.time += dt;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// Drain the call log.
    pub fn take_calls(&mut self) -> Vec<EngineCall> {
        std::mem::take(&mut self.calls)
    }

    /// Most recent seek target, if any.
    pub fn last_seek(&self) -> Option<f64> {
        self.calls.iter().rev().find_map(|call| match call {
            EngineCall::Seek(t) => Some(*t),
            _ => None,
        })
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn load(&mut self, source: &Path) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Load(source.to_path_buf()));
        if self.failing.contains(source) {
            return Err(EngineError::Load {
                path: source.to_path_buf(),
                reason: "simulated load failure".into(),
            });
        }
        self.source = Some(source.to_path_buf());
        self.time = 0.0;
        self.playing = false;
        self.pending_frames = self.load_latency;
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Play);
        if self.source.is_none() {
            return Err(EngineError::Playback("no source loaded".into()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Pause);
        self.playing = false;
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Seek(seconds));
        if self.source.is_none() || !seconds.is_finite() {
            return Err(EngineError::Seek {
                target: seconds,
                reason: "no source loaded or invalid target".into(),
            });
        }
        self.time = seconds.max(0.0);
        Ok(())
    }

    fn current_time(&self) -> Option<f64> {
        if self.source.is_some() && self.pending_frames == 0 {
            Some(self.time)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_moves_only_when_playing() {
        let mut engine = SimulatedEngine::new();
        engine.load(Path::new("a.mp4")).unwrap();
        engine.advance(1.0);
        assert_eq!(engine.current_time(), Some(0.0));

        engine.play().unwrap();
        engine.advance(0.5);
        assert_eq!(engine.current_time(), Some(0.5));
    }

    #[test]
    fn test_load_latency_hides_time() {
        let mut engine = SimulatedEngine::new().with_load_latency(2);
        engine.load(Path::new("a.mp4")).unwrap();
        engine.seek(3.0).unwrap();
        engine.play().unwrap();

        assert_eq!(engine.current_time(), None);
        engine.advance(0.1);
        engine.advance(0.1);
        assert_eq!(engine.current_time(), Some(3.0));
        engine.advance(0.25);
        assert_eq!(engine.current_time(), Some(3.25));
    }

    #[test]
    fn test_load_pauses_and_failures() {
        let mut engine = SimulatedEngine::new();
        engine.fail_loads_of("bad.mp4");
        assert!(engine.play().is_err());

        engine.load(Path::new("a.mp4")).unwrap();
        engine.play().unwrap();
        engine.load(Path::new("b.mp4")).unwrap();
        assert!(!engine.is_playing());

        assert!(engine.load(Path::new("bad.mp4")).is_err());
        assert_eq!(engine.source(), Some(Path::new("b.mp4")));
    }

    #[test]
    fn test_seek_needs_source_and_finite_target() {
        let mut engine = SimulatedEngine::new();
        assert!(matches!(engine.seek(1.0), Err(EngineError::Seek { .. })));

        engine.load(Path::new("a.mp4")).unwrap();
        assert!(matches!(
            engine.seek(f64::NAN),
            Err(EngineError::Seek { .. })
        ));
        engine.seek(2.0).unwrap();
        assert_eq!(engine.current_time(), Some(2.0));
    }

    #[test]
    fn test_call_log() {
        let mut engine = SimulatedEngine::new();
        engine.load(Path::new("a.mp4")).unwrap();
        engine.seek(1.5).unwrap();
        assert_eq!(engine.last_seek(), Some(1.5));
        assert_eq!(engine.take_calls().len(), 2);
        assert!(engine.calls().is_empty());
    }
}
