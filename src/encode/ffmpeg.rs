use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Video-only encoding parameters.
#[derive(Clone, Debug)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: String,
    pub pix_fmt: String,
    pub crf: u32,
}

/// Raw RGBA frames in, silent video out.
pub struct FfmpegEncoder {
    child: Child,
    frame_len: usize,
}

impl FfmpegEncoder {
    pub fn new(output_path: &Path, settings: &VideoSettings) -> Result<Self> {
        let args = vec![
            "-y".to_string(),
            "-loglevel".into(), "error".into(),
            "-f".into(), "rawvideo".into(),
            "-pixel_format".into(), "rgba".into(),
            "-video_size".into(), format!("{}x{}", settings.width, settings.height),
            "-framerate".into(), settings.fps.to_string(),
            "-i".into(), "pipe:0".into(),
            "-an".into(),
            "-c:v".into(), settings.codec.clone(),
            "-pix_fmt".into(), settings.pix_fmt.clone(),
            "-crf".into(), settings.crf.to_string(),
            "-preset".into(), "medium".into(),
            output_path.to_string_lossy().into_owned(),
        ];

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        log::info!(
            "FFmpeg encoder started: {}x{} @ {}fps, codec={}",
            settings.width, settings.height, settings.fps, settings.codec
        );

        Ok(Self {
            child,
            frame_len: settings.width as usize * settings.height as usize * 4,
        })
    }

    pub fn write_frame(&mut self, rgba_pixels: &[u8]) -> Result<()> {
        anyhow::ensure!(
            rgba_pixels.len() == self.frame_len,
            "Frame is {} bytes, expected {}",
            rgba_pixels.len(),
            self.frame_len
        );
        let stdin = self.child.stdin.as_mut().context("FFmpeg stdin not available")?;
        stdin.write_all(rgba_pixels).context("Failed to write frame to ffmpeg")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        // Close stdin to signal EOF
        drop(self.child.stdin.take());

        let mut stderr = String::new();
        if let Some(mut pipe) = self.child.stderr.take() {
            pipe.read_to_string(&mut stderr)
                .context("Failed to read ffmpeg output")?;
        }
        let status = self.child.wait().context("Failed to wait for ffmpeg")?;

        if !status.success() {
            anyhow::bail!("FFmpeg exited with error:\n{}", stderr);
        }

        log::info!("FFmpeg encoding complete");
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    /// Reaps ffmpeg when encoding is abandoned. A no-op after `finish`.
    fn drop(&mut self) {
        drop(self.child.stdin.take());
        if let Err(err) = self.child.wait() {
            log::warn!("Failed to wait for ffmpeg: {}", err);
        }
    }
}

/// Combine a silent video with a soundtrack, copying the video stream.
pub fn mux_audio(video: &Path, audio: &Path, output: &Path) -> Result<()> {
    let result = Command::new("ffmpeg")
        .arg("-y")
        .args(["-loglevel", "error"])
        .arg("-i")
        .arg(video)
        .arg("-i")
        .arg(audio)
        .args(["-c:v", "copy", "-c:a", "aac", "-b:a", "192k", "-shortest"])
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .context("Failed to spawn ffmpeg for muxing")?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        anyhow::bail!("FFmpeg mux failed:\n{}", stderr);
    }

    log::info!("Muxed soundtrack into {}", output.display());
    Ok(())
}
