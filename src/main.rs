mod audio;
mod cli;
mod config;
mod encode;
mod error;
mod playback;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use audio::analysis::SpectrumAnalyzer;
use audio::bars::BarMapper;
use audio::source::SampleSource;
use cli::Cli;
use encode::ffmpeg::{FfmpegEncoder, VideoSettings};
use error::SetupError;
use playback::controls::ScriptedControls;
use playback::engine::{OfflinePlayback, PlaybackEngine};
use render::driver::{RenderLoop, VideoRenderer};
use render::frame::{BarStyle, FrameComposer};
use render::text::TextOverlay;

const TITLE_SIZE: f32 = 56.0;
const TIME_SIZE: f32 = 36.0;
/// Largest frame edge ffmpeg's common encoders accept.
const MAX_DIMENSION: u32 = 16384;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            if err.downcast_ref::<SetupError>().is_some() {
                ExitCode::from(SetupError::EXIT_CODE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run() -> Result<()> {
    let mut cli = Cli::parse();

    let config = match config::find_config(cli.config.as_deref()) {
        Some(path) => match config::load_config(&path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                config::Config::default()
            }
        },
        None => config::Config::default(),
    };
    let bar_style = BarStyle {
        width: config.bars.width,
        spacing: config.bars.spacing,
        color: config.bars.color,
        ..BarStyle::default()
    };
    config.merge_into(&mut cli);
    validate(&cli)?;

    log::info!("spectra - audio spectrum visualizer");
    log::info!("Input: {}", cli.input.display());
    log::info!("Output: {}", cli.output.display());
    log::info!("Resolution: {}x{} @ {}fps", cli.width, cli.height, cli.fps);

    // 1. Assets. Any failure here exits before a frame is produced.
    let font = render::text::load_font(&cli.font)?;
    let background = render::frame::load_background(&cli.background)?;
    let track = audio::decode::decode_audio(&cli.input)?;

    // 2. Analysis pipeline
    let window = cli.window.coefficients(cli.frame_size)?;
    let analyzer = SpectrumAnalyzer::new(window)?;
    let mapper = BarMapper::new(cli.layout, cli.bars, cli.scale, analyzer.bin_count())?;
    let mut controls = ScriptedControls::parse(cli.presses.as_slice())?;
    log::info!(
        "Analysis: {} samples/frame ({:?} window), {} bars ({:?}), scale {}",
        analyzer.frame_size(),
        cli.window,
        mapper.count(),
        cli.layout,
        cli.scale
    );

    let length = cli.length.unwrap_or_else(|| track.duration());
    let total_frames = (length * cli.fps as f64).ceil() as usize;
    log::info!("Rendering {} frames ({:.1}s)", total_frames, length);

    // 3. Renderer
    let title = cli.title.clone().unwrap_or_else(|| default_title(&cli.input));
    let composer = FrameComposer::new(
        cli.width,
        cli.height,
        Some(background),
        title,
        TextOverlay::from_font(font.clone(), TITLE_SIZE),
        TextOverlay::from_font(font, TIME_SIZE),
        bar_style,
    );

    let video_path = temp_sibling(&cli.output, "video.mkv");
    let audio_path = temp_sibling(&cli.output, "audio.wav");
    let _temp_files = TempFiles(vec![video_path.clone(), audio_path.clone()]);
    let encoder = FfmpegEncoder::new(
        &video_path,
        &VideoSettings {
            width: composer.width(),
            height: composer.height(),
            fps: cli.fps,
            codec: cli.codec.clone(),
            pix_fmt: cli.pix_fmt.clone(),
            crf: cli.crf,
        },
    )?;
    let mut renderer = VideoRenderer::new(composer, encoder);

    // 4. Render loop
    let mut engine = OfflinePlayback::new(&track, cli.volume as f32 / 100.0);
    engine.play();

    let pb = ProgressBar::new(total_frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let mut render_loop = RenderLoop::new(analyzer, mapper, cli.fps);
    render_loop.run(
        &track,
        &mut engine,
        &mut controls,
        &mut renderer,
        total_frames,
        |done| pb.set_position(done as u64),
    )?;
    pb.finish_with_message("Rendering complete");
    log::info!("Final playback state: {} at {:.2}s", engine.status(), engine.playing_offset());

    // 5. Soundtrack + mux
    log::info!("Finishing encoding...");
    renderer.into_encoder().finish()?;
    encode::wav::write_wav(
        &audio_path,
        engine.recording(),
        track.channels(),
        track.sample_rate(),
    )?;
    encode::ffmpeg::mux_audio(&video_path, &audio_path, &cli.output)?;

    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), SetupError> {
    if cli.width == 0 || cli.height == 0 {
        return Err(SetupError::Setting(format!(
            "resolution must be non-zero, got {}x{}",
            cli.width, cli.height
        )));
    }
    if cli.width > MAX_DIMENSION || cli.height > MAX_DIMENSION {
        return Err(SetupError::Setting(format!(
            "resolution must be at most {MAX_DIMENSION}x{MAX_DIMENSION}, got {}x{}",
            cli.width, cli.height
        )));
    }
    if cli.fps == 0 {
        return Err(SetupError::Setting("fps must be positive".into()));
    }
    if cli.volume > 100 {
        return Err(SetupError::Setting(format!("volume must be 0-100, got {}", cli.volume)));
    }
    if let Some(length) = cli.length {
        if !length.is_finite() || length <= 0.0 {
            return Err(SetupError::Setting(format!("length must be positive, got {length}")));
        }
    }
    Ok(())
}

fn default_title(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `dir/out.mp4` -> `dir/.out.<suffix>`, for intermediate files.
fn temp_sibling(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "spectra".into());
    output.with_file_name(format!(".{stem}.{suffix}"))
}

/// Intermediate files, removed when the run ends whether or not it succeeded.
struct TempFiles(Vec<PathBuf>);

impl Drop for TempFiles {
    fn drop(&mut self) {
        for tmp in &self.0 {
            match std::fs::remove_file(tmp) {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
                    log::warn!("Failed to remove {}: {}", tmp.display(), err);
                }
                _ => {}
            }
        }
    }
}
