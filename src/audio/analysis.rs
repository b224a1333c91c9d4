use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::source::SampleSource;
use super::window::WindowCoefficients;
use crate::error::SetupError;

/// Forward FFT over one windowed frame per call.
///
/// The plan, working buffer and scratch space are created once and reused
/// for every frame; callers only ever see [`SpectrumAnalyzer::analyze`].
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    window: WindowCoefficients,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl SpectrumAnalyzer {
    /// Plan a transform sized to `window`.
    pub fn new(window: WindowCoefficients) -> Result<Self, SetupError> {
        let frame_size = window.len();
        if frame_size < 2 {
            return Err(SetupError::FrameSize(frame_size));
        }

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(frame_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Ok(Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); frame_size],
            scratch,
        })
    }

    pub fn frame_size(&self) -> usize {
        self.window.len()
    }

    /// Number of magnitudes produced per frame.
    pub fn bin_count(&self) -> usize {
        self.frame_size() / 2
    }

    /// Magnitudes of the positive-frequency bins for the frame starting at
    /// mono sample `start`. Reads wrap around the end of `source`, so any
    /// `start` is valid. Output is not normalized by the frame size.
    pub fn analyze<S: SampleSource>(&mut self, source: &S, start: usize) -> Vec<f32> {
        let count = source.sample_count();
        for (i, (slot, weight)) in self.buffer.iter_mut().zip(self.window.iter()).enumerate() {
            let index = (start % count + i) % count;
            *slot = Complex::new(source.sample_at(index) * weight, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        self.buffer[..self.bin_count()]
            .iter()
            .map(|c| c.norm() as f32)
            .collect()
    }
}
