use anyhow::{Context, Result};
use std::path::Path;

/// Write interleaved 16-bit PCM as a WAV file.
pub fn write_wav(path: &Path, samples: &[i16], channels: u16, sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for &sample in samples {
        writer.write_sample(sample).context("Failed to write WAV samples")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}
