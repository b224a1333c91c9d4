use std::ops::Range;

use super::clock::current_sample_index;
use super::state::{PlaybackStatus, Transport};
use crate::audio::source::{AudioBuffer, SampleSource};

/// The playback subsystem as seen by the render loop: a transport that can
/// be driven by controls and an authoritative elapsed time.
pub trait PlaybackEngine {
    fn status(&self) -> PlaybackStatus;

    /// Elapsed position in seconds. Frozen while paused, 0 when stopped.
    fn playing_offset(&self) -> f64;

    fn play(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    /// Called by the frame pacer after each rendered frame. Engines that
    /// follow a hardware clock ignore it.
    fn advance(&mut self, _frame_secs: f64) {}
}

/// Plays a decoded track against the video timeline instead of a sound
/// device. Everything it plays, including silence while paused or
/// stopped, is kept so the soundtrack can be muxed next to the frames.
pub struct OfflinePlayback<'a> {
    track: &'a AudioBuffer,
    transport: Transport,
    /// Next track frame to play.
    position: usize,
    volume: f32,
    timeline: f64,
    recorded_frames: usize,
    recording: Vec<i16>,
}

impl<'a> OfflinePlayback<'a> {
    /// `volume` is a linear gain in `[0, 1]`.
    pub fn new(track: &'a AudioBuffer, volume: f32) -> Self {
        Self {
            track,
            transport: Transport::default(),
            position: 0,
            volume: volume.clamp(0.0, 1.0),
            timeline: 0.0,
            recorded_frames: 0,
            recording: Vec::new(),
        }
    }

    /// Interleaved samples heard so far.
    pub fn recording(&self) -> &[i16] {
        &self.recording
    }

    fn record(&mut self, frames: Range<usize>) {
        let volume = self.volume;
        self.recording.extend(
            self.track
                .interleaved(frames)
                .iter()
                .map(|&s| (s as f32 * volume) as i16),
        );
    }

    fn record_silence(&mut self, frames: usize) {
        let len = self.recording.len() + frames * self.track.channels() as usize;
        self.recording.resize(len, 0);
    }
}

impl PlaybackEngine for OfflinePlayback<'_> {
    fn status(&self) -> PlaybackStatus {
        self.transport.status()
    }

    fn playing_offset(&self) -> f64 {
        self.position as f64 / self.track.sample_rate() as f64
    }

    fn play(&mut self) {
        self.transport.play();
    }

    fn pause(&mut self) {
        self.transport.pause();
    }

    fn stop(&mut self) {
        if self.transport.stop() {
            self.position = 0;
        }
    }

    fn advance(&mut self, frame_secs: f64) {
        let sample_rate = self.track.sample_rate();
        let track_len = self.track.sample_count();

        self.timeline += frame_secs;
        let due_total = current_sample_index(self.timeline, sample_rate);
        let mut due = due_total.saturating_sub(self.recorded_frames);
        self.recorded_frames = self.recorded_frames.max(due_total);

        if self.transport.status() == PlaybackStatus::Playing {
            let start = self.position.min(track_len);
            let end = (start + due).min(track_len);
            self.record(start..end);
            due -= end - start;

            self.position = end;
            if self.position >= track_len {
                log::info!("Reached end of track");
                self.stop();
            }
        }

        self.record_silence(due);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> AudioBuffer {
        // 1 second at 8 Hz, stereo; left = frame index, right = -frame index
        let samples = (0..8i16).flat_map(|i| [i * 100, -i * 100]).collect();
        AudioBuffer::new(samples, 2, 8).unwrap()
    }

    #[test]
    fn starts_stopped_at_zero() {
        let track = track();
        let engine = OfflinePlayback::new(&track, 1.0);
        assert_eq!(engine.status(), PlaybackStatus::Stopped);
        assert_eq!(engine.playing_offset(), 0.0);
    }

    #[test]
    fn offset_moves_only_while_playing() {
        let track = track();
        let mut engine = OfflinePlayback::new(&track, 1.0);

        engine.advance(0.25);
        assert_eq!(engine.playing_offset(), 0.0);

        engine.play();
        engine.advance(0.25);
        assert_eq!(engine.playing_offset(), 0.25);

        engine.pause();
        engine.advance(0.25);
        assert_eq!(engine.playing_offset(), 0.25);

        engine.play();
        engine.advance(0.25);
        assert_eq!(engine.playing_offset(), 0.5);

        engine.stop();
        assert_eq!(engine.playing_offset(), 0.0);
    }

    #[test]
    fn pause_is_ignored_when_not_playing() {
        let track = track();
        let mut engine = OfflinePlayback::new(&track, 1.0);
        engine.pause();
        assert_eq!(engine.status(), PlaybackStatus::Stopped);
    }

    #[test]
    fn end_of_track_stops_and_rewinds() {
        let track = track();
        let mut engine = OfflinePlayback::new(&track, 1.0);
        engine.play();
        for _ in 0..4 {
            engine.advance(0.25);
        }
        assert_eq!(engine.status(), PlaybackStatus::Stopped);
        assert_eq!(engine.playing_offset(), 0.0);
    }

    #[test]
    fn recording_follows_the_timeline() {
        let track = track();
        let mut engine = OfflinePlayback::new(&track, 1.0);

        // 2 frames of silence before play
        engine.advance(0.25);
        engine.play();
        // frames 0..2 of the track
        engine.advance(0.25);
        engine.pause();
        // 2 frames of silence
        engine.advance(0.25);

        assert_eq!(
            engine.recording(),
            &[0, 0, 0, 0, 0, 0, 100, -100, 0, 0, 0, 0]
        );
    }

    #[test]
    fn recording_pads_past_the_end() {
        let track = track();
        let mut engine = OfflinePlayback::new(&track, 1.0);
        engine.play();
        engine.advance(1.5);
        assert_eq!(engine.recording().len(), 12 * 2);
        assert_eq!(engine.recording()[14], 700);
        assert!(engine.recording()[16..].iter().all(|&s| s == 0));
        assert_eq!(engine.status(), PlaybackStatus::Stopped);
    }

    #[test]
    fn soundtrack_stays_contiguous_across_pause() {
        let samples: Vec<i16> = (0..88_200).map(|i| (i % 32_000 + 1) as i16).collect();
        let track = AudioBuffer::new(samples, 1, 44_100).unwrap();
        let mut engine = OfflinePlayback::new(&track, 1.0);
        let frame_secs = 1.0 / 60.0;

        engine.play();
        for _ in 0..7 {
            engine.advance(frame_secs);
        }
        engine.pause();
        for _ in 0..3 {
            engine.advance(frame_secs);
        }
        engine.play();
        for _ in 0..100 {
            engine.advance(frame_secs);
        }

        let heard: Vec<i16> = engine.recording().iter().copied().filter(|&s| s != 0).collect();
        assert_eq!(heard.as_slice(), track.interleaved(0..heard.len()));
        assert_eq!(engine.playing_offset(), heard.len() as f64 / 44_100.0);

        // 3 paused frames of 735 samples each
        let silence = engine.recording().len() - heard.len();
        assert!((2204..=2206).contains(&silence), "silence = {silence}");
    }

    #[test]
    fn volume_scales_recorded_samples() {
        let track = track();
        let mut engine = OfflinePlayback::new(&track, 0.5);
        engine.play();
        engine.advance(0.5);
        assert_eq!(engine.recording(), &[0, 0, 50, -50, 100, -100, 150, -150]);
    }
}
