use anyhow::Result;

use super::frame::FrameComposer;
use crate::audio::analysis::SpectrumAnalyzer;
use crate::audio::bars::BarMapper;
use crate::audio::source::SampleSource;
use crate::encode::ffmpeg::FfmpegEncoder;
use crate::playback::clock::{current_sample_index, format_elapsed};
use crate::playback::controls::ControlSource;
use crate::playback::engine::PlaybackEngine;

/// What the pipeline hands to the renderer each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    /// One non-negative height per bar, lowest frequency first.
    pub bars: Vec<f32>,
    /// Playback offset the bars were computed for, as `M:SS`.
    pub elapsed_label: String,
}

pub trait Renderer {
    fn render(&mut self, frame: &FrameOutput) -> Result<()>;
}

/// Composes frames and pipes them to ffmpeg.
pub struct VideoRenderer {
    composer: FrameComposer,
    encoder: FfmpegEncoder,
}

impl VideoRenderer {
    pub fn new(composer: FrameComposer, encoder: FfmpegEncoder) -> Self {
        Self { composer, encoder }
    }

    pub fn into_encoder(self) -> FfmpegEncoder {
        self.encoder
    }
}

impl Renderer for VideoRenderer {
    fn render(&mut self, frame: &FrameOutput) -> Result<()> {
        let pixels = self.composer.compose(&frame.bars, &frame.elapsed_label);
        self.encoder.write_frame(&pixels)
    }
}

/// Runs the analysis pipeline once per frame at a fixed frame rate.
pub struct RenderLoop {
    analyzer: SpectrumAnalyzer,
    mapper: BarMapper,
    fps: u32,
}

impl RenderLoop {
    pub fn new(analyzer: SpectrumAnalyzer, mapper: BarMapper, fps: u32) -> Self {
        Self {
            analyzer,
            mapper,
            fps,
        }
    }

    /// Bars and time label for the engine's current position.
    pub fn frame<S: SampleSource>(&mut self, source: &S, engine: &dyn PlaybackEngine) -> FrameOutput {
        let elapsed = engine.playing_offset();
        let start = current_sample_index(elapsed, source.sample_rate());
        let magnitudes = self.analyzer.analyze(source, start);

        FrameOutput {
            bars: self.mapper.map(&magnitudes),
            elapsed_label: format_elapsed(elapsed),
        }
    }

    /// Render `frames` frames. Keys are polled after each frame is drawn,
    /// then the engine is advanced by one frame period. `on_frame` is told
    /// how many frames are done.
    pub fn run<S: SampleSource>(
        &mut self,
        source: &S,
        engine: &mut dyn PlaybackEngine,
        controls: &mut dyn ControlSource,
        renderer: &mut dyn Renderer,
        frames: usize,
        mut on_frame: impl FnMut(usize),
    ) -> Result<()> {
        let frame_secs = 1.0 / self.fps as f64;

        for frame_idx in 0..frames {
            let output = self.frame(source, engine);
            renderer.render(&output)?;

            let video_time = frame_idx as f64 * frame_secs;
            for key in controls.pressed(video_time) {
                key.apply(engine);
            }

            engine.advance(frame_secs);
            on_frame(frame_idx + 1);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::bars::BarLayout;
    use crate::audio::source::AudioBuffer;
    use crate::audio::window::WindowFunction;
    use crate::playback::controls::ScriptedControls;
    use crate::playback::engine::OfflinePlayback;
    use crate::playback::state::PlaybackStatus;

    #[derive(Default)]
    struct Collect(Vec<FrameOutput>);

    impl Renderer for Collect {
        fn render(&mut self, frame: &FrameOutput) -> Result<()> {
            self.0.push(frame.clone());
            Ok(())
        }
    }

    fn render_loop(frame_size: usize, bars: usize, fps: u32) -> RenderLoop {
        let window = WindowFunction::Hamming.coefficients(frame_size).unwrap();
        let analyzer = SpectrumAnalyzer::new(window).unwrap();
        let mapper = BarMapper::new(BarLayout::Linear, bars, 0.8, frame_size / 2).unwrap();
        RenderLoop::new(analyzer, mapper, fps)
    }

    fn noise(len: usize) -> AudioBuffer {
        let samples = (0..len as i64)
            .map(|i| ((i * 7919 + 13) % 20000 - 10000) as i16)
            .collect();
        AudioBuffer::new(samples, 1, 100).unwrap()
    }

    #[test]
    fn frame_reflects_engine_position() {
        let track = noise(1000);
        let mut engine = OfflinePlayback::new(&track, 1.0);
        let mut pipeline = render_loop(64, 10, 4);

        let at_start = pipeline.frame(&track, &engine);
        assert_eq!(at_start.elapsed_label, "0:00");
        assert_eq!(at_start.bars.len(), 10);

        engine.play();
        engine.advance(5.0);
        let later = pipeline.frame(&track, &engine);
        assert_eq!(later.elapsed_label, "0:05");
        assert_ne!(at_start.bars, later.bars);
        assert!(later.bars.iter().all(|&b| b >= 0.0));
    }

    #[test]
    fn run_renders_requested_frames_and_applies_keys() {
        let track = noise(1000);
        let mut engine = OfflinePlayback::new(&track, 1.0);
        engine.play();
        let mut controls = ScriptedControls::parse(&["2:x", "4:z"]).unwrap();
        let mut renderer = Collect::default();
        let mut pipeline = render_loop(64, 8, 1);
        let mut done = 0;

        pipeline
            .run(&track, &mut engine, &mut controls, &mut renderer, 8, |n| done = n)
            .unwrap();

        assert_eq!(done, 8);
        let labels: Vec<&str> = renderer.0.iter().map(|f| f.elapsed_label.as_str()).collect();
        // paused after the frame at 2s, resumed after the frame at 4s
        assert_eq!(labels, ["0:00", "0:01", "0:02", "0:02", "0:02", "0:03", "0:04", "0:05"]);
        assert_eq!(renderer.0[2].bars, renderer.0[4].bars);
        assert_eq!(engine.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn silent_track_renders_flat_bars() {
        let track = AudioBuffer::new(vec![0; 500], 2, 100).unwrap();
        let mut engine = OfflinePlayback::new(&track, 1.0);
        engine.play();
        let mut pipeline = render_loop(32, 16, 10);
        let output = pipeline.frame(&track, &engine);
        assert!(output.bars.iter().all(|&b| b == 0.0));
    }
}
