use crate::error::SetupError;

/// Read-only, first-channel view of decoded audio.
pub trait SampleSource {
    /// Normalized amplitude of mono frame `index`, in `[-1.0, 1.0)`.
    /// `index` must be below [`SampleSource::sample_count`].
    fn sample_at(&self, index: usize) -> f64;

    /// Number of mono frames (interleaved samples / channels).
    fn sample_count(&self) -> usize;

    fn sample_rate(&self) -> u32;
}

/// Fully decoded interleaved 16-bit PCM, immutable once loaded.
#[derive(Clone, Debug)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    channels: u16,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<i16>, channels: u16, sample_rate: u32) -> Result<Self, SetupError> {
        if samples.is_empty() {
            return Err(SetupError::EmptyAudio);
        }
        if channels == 0 {
            return Err(SetupError::MalformedAudio("zero channels".into()));
        }
        if sample_rate == 0 {
            return Err(SetupError::MalformedAudio("zero sample rate".into()));
        }
        if samples.len() % channels as usize != 0 {
            return Err(SetupError::MalformedAudio(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }

        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn duration(&self) -> f64 {
        self.sample_count() as f64 / self.sample_rate as f64
    }

    /// Interleaved samples of the mono frames in `frames`.
    pub fn interleaved(&self, frames: std::ops::Range<usize>) -> &[i16] {
        let stride = self.channels as usize;
        &self.samples[frames.start * stride..frames.end * stride]
    }
}

impl SampleSource for AudioBuffer {
    fn sample_at(&self, index: usize) -> f64 {
        self.samples[index * self.channels as usize] as f64 / 32768.0
    }

    fn sample_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_channel_only() {
        let buffer = AudioBuffer::new(vec![16384, -1, -16384, 7, 0, 9], 2, 8000).unwrap();
        assert_eq!(buffer.sample_count(), 3);
        assert_eq!(buffer.sample_at(0), 0.5);
        assert_eq!(buffer.sample_at(1), -0.5);
        assert_eq!(buffer.sample_at(2), 0.0);
    }

    #[test]
    fn normalizes_full_scale() {
        let buffer = AudioBuffer::new(vec![i16::MIN, i16::MAX], 1, 44100).unwrap();
        assert_eq!(buffer.sample_at(0), -1.0);
        assert!(buffer.sample_at(1) < 1.0);
    }

    #[test]
    fn rejects_empty_buffer() {
        assert!(matches!(
            AudioBuffer::new(Vec::new(), 2, 44100),
            Err(SetupError::EmptyAudio)
        ));
    }

    #[test]
    fn rejects_partial_frames() {
        assert!(matches!(
            AudioBuffer::new(vec![1, 2, 3], 2, 44100),
            Err(SetupError::MalformedAudio(_))
        ));
        assert!(AudioBuffer::new(vec![1, 2], 0, 44100).is_err());
        assert!(AudioBuffer::new(vec![1, 2], 1, 0).is_err());
    }

    #[test]
    fn interleaved_slices_whole_frames() {
        let buffer = AudioBuffer::new(vec![1, 2, 3, 4, 5, 6], 2, 100).unwrap();
        assert_eq!(buffer.interleaved(1..3), &[3, 4, 5, 6]);
        assert_eq!(buffer.duration(), 0.03);
    }
}
