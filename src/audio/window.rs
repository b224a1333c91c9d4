use std::f64::consts::PI;
use std::ops::Deref;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::SetupError;

/// Smoothing curve applied to each analysis frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    #[default]
    Hamming,
    Hann,
}

impl WindowFunction {
    /// Precompute `frame_size` symmetric weights. Needs `frame_size >= 2`
    /// since the curve is defined over `frame_size - 1` intervals.
    pub fn coefficients(self, frame_size: usize) -> Result<WindowCoefficients, SetupError> {
        if frame_size < 2 {
            return Err(SetupError::FrameSize(frame_size));
        }

        let span = (frame_size - 1) as f64;
        let weights = (0..frame_size)
            .map(|i| {
                let phase = (2.0 * PI * i as f64 / span).cos();
                match self {
                    WindowFunction::Hamming => 0.54 - 0.46 * phase,
                    WindowFunction::Hann => 0.5 - 0.5 * phase,
                }
            })
            .collect();

        Ok(WindowCoefficients(weights))
    }
}

/// Immutable weights for one frame size.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowCoefficients(Vec<f64>);

impl Deref for WindowCoefficients {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}
