use std::ops::Range;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::SetupError;

/// How magnitude bins are assigned to bars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BarLayout {
    /// Bar `i` shows bin `i`; only the lowest `count` bins are drawn.
    #[default]
    Linear,
    /// Bars span the whole half-spectrum in log-spaced bands.
    Log,
}

/// Bar `i` is `scale * magnitudes[i]` for the first `count` bins.
pub fn map_to_bars(magnitudes: &[f32], count: usize, scale: f32) -> Vec<f32> {
    magnitudes.iter().take(count).map(|&m| scale * m).collect()
}

/// Bar heights for one frame; nothing is carried between frames.
#[derive(Clone, Debug)]
pub struct BarMapper {
    count: usize,
    scale: f32,
    bands: Option<Vec<Range<usize>>>,
}

impl BarMapper {
    pub fn new(layout: BarLayout, count: usize, scale: f32, bins: usize) -> Result<Self, SetupError> {
        if count == 0 || count > bins {
            return Err(SetupError::TooManyBars { bars: count, bins });
        }
        if !scale.is_finite() || scale < 0.0 {
            return Err(SetupError::Setting(format!("bar scale must be >= 0, got {scale}")));
        }

        let bands = match layout {
            BarLayout::Linear => None,
            BarLayout::Log => Some(log_bands(count, bins)),
        };

        Ok(Self {
            count,
            scale,
            bands,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn map(&self, magnitudes: &[f32]) -> Vec<f32> {
        let Some(bands) = &self.bands else {
            return map_to_bars(magnitudes, self.count, self.scale);
        };

        bands
            .iter()
            .map(|band| {
                let peak = magnitudes
                    .get(band.clone())
                    .unwrap_or_default()
                    .iter()
                    .copied()
                    .fold(0.0f32, f32::max);
                self.scale * peak
            })
            .collect()
    }
}

/// Split bins `1..bins` into `count` contiguous, non-empty bands whose edges
/// are evenly spaced on a log scale. The DC bin is skipped when there is
/// room for it.
fn log_bands(count: usize, bins: usize) -> Vec<Range<usize>> {
    let first = if bins > count { 1 } else { 0 };
    let span = (bins - first) as f64;

    let mut bands = Vec::with_capacity(count);
    let mut start = first;
    for i in 0..count {
        let remaining = count - i - 1;
        let ideal = first as f64 + span.powf((i + 1) as f64 / count as f64);
        let end = (ideal.round() as usize)
            .max(start + 1)
            .min(bins - remaining);
        bands.push(start..end);
        start = end;
    }
    bands
}
