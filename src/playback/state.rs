use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackStatus::Stopped => "stopped",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Guarded transport transitions. Each method returns whether the state
/// changed, so repeated triggers from a held key are harmless.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transport {
    status: PlaybackStatus,
}

impl Transport {
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Stopped or Paused -> Playing.
    pub fn play(&mut self) -> bool {
        self.set(PlaybackStatus::Playing)
    }

    /// Playing -> Paused; no-op otherwise.
    pub fn pause(&mut self) -> bool {
        if self.status != PlaybackStatus::Playing {
            return false;
        }
        self.set(PlaybackStatus::Paused)
    }

    /// Any state -> Stopped.
    pub fn stop(&mut self) -> bool {
        self.set(PlaybackStatus::Stopped)
    }

    fn set(&mut self, next: PlaybackStatus) -> bool {
        if self.status == next {
            return false;
        }
        log::debug!("Playback {} -> {}", self.status, next);
        self.status = next;
        true
    }
}
