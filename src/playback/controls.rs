use std::str::FromStr;

use super::engine::PlaybackEngine;
use super::state::PlaybackStatus;
use crate::error::SetupError;

/// Transport keys, polled once per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Z: play unless already playing.
    Resume,
    /// X: pause if playing.
    Pause,
    /// C: stop unconditionally.
    Stop,
}

impl Key {
    /// Apply this key to `engine`. Holding a key re-applies it every frame,
    /// which is harmless because every transition is guarded on the
    /// current status.
    pub fn apply(self, engine: &mut dyn PlaybackEngine) {
        match self {
            Key::Resume => {
                if engine.status() != PlaybackStatus::Playing {
                    engine.play();
                }
            }
            Key::Pause => {
                if engine.status() == PlaybackStatus::Playing {
                    engine.pause();
                }
            }
            Key::Stop => engine.stop(),
        }
    }
}

impl FromStr for Key {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "z" | "resume" | "play" => Ok(Key::Resume),
            "x" | "pause" => Ok(Key::Pause),
            "c" | "stop" => Ok(Key::Stop),
            _ => Err(SetupError::Control(s.to_string())),
        }
    }
}

/// Source of key state for the render loop.
pub trait ControlSource {
    /// Keys held down at video time `time`.
    fn pressed(&mut self, time: f64) -> Vec<Key>;
}

/// A key press at a fixed point of the video timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScriptedPress {
    pub at: f64,
    pub key: Key,
}

impl FromStr for ScriptedPress {
    type Err = SetupError;

    /// `SECONDS:KEY`, e.g. `12.5:x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SetupError::Control(s.to_string());
        let (at, key) = s.split_once(':').ok_or_else(invalid)?;
        let at: f64 = at.trim().parse().map_err(|_| invalid())?;
        if !at.is_finite() || at < 0.0 {
            return Err(invalid());
        }
        let key = key.parse().map_err(|_| invalid())?;
        Ok(Self { at, key })
    }
}

/// Replays scripted presses. Each press is held for exactly one poll: the
/// first one at or after its time.
#[derive(Debug, Default)]
pub struct ScriptedControls {
    presses: Vec<ScriptedPress>,
    next: usize,
}

impl ScriptedControls {
    pub fn new(mut presses: Vec<ScriptedPress>) -> Self {
        presses.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { presses, next: 0 }
    }

    pub fn parse<S: AsRef<str>>(specs: &[S]) -> Result<Self, SetupError> {
        let presses = specs
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(presses))
    }
}

impl ControlSource for ScriptedControls {
    fn pressed(&mut self, time: f64) -> Vec<Key> {
        let due = self.presses[self.next..]
            .iter()
            .take_while(|p| p.at <= time)
            .count();
        let keys: Vec<Key> = self.presses[self.next..self.next + due]
            .iter()
            .map(|p| p.key)
            .collect();
        self.next += due;
        for key in &keys {
            log::debug!("Key {:?} at {:.3}s", key, time);
        }
        keys
    }
}
