use clap::Parser;
use std::path::PathBuf;

use crate::audio::bars::BarLayout;
use crate::audio::window::WindowFunction;

#[derive(Parser, Debug)]
#[command(name = "spectra", about = "Renders a spectrum bar visualization of an audio track to video")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: PathBuf,

    /// Output video file
    #[arg(short, long, default_value = "visualizer.mp4")]
    pub output: PathBuf,

    /// Config file (defaults to ./spectra.toml or ~/.config/spectra/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Title text; defaults to the input file name
    #[arg(long)]
    pub title: Option<String>,

    /// Font used for the title and elapsed time
    #[arg(long, default_value = "NotoSans-VariableFont_wdth,wght.ttf")]
    pub font: PathBuf,

    /// Background image drawn behind the bars
    #[arg(long, default_value = "bg.png")]
    pub background: PathBuf,

    /// Video width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Video height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// H.264 CRF quality (0-51, lower = better)
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,

    /// Samples per analysis frame
    #[arg(long, default_value_t = 4096)]
    pub frame_size: usize,

    /// Window applied to each analysis frame
    #[arg(long, value_enum, default_value_t = WindowFunction::Hamming)]
    pub window: WindowFunction,

    /// Number of bars (at most frame_size / 2)
    #[arg(long, default_value_t = 150)]
    pub bars: usize,

    /// Bar height per unit of magnitude
    #[arg(long, default_value_t = 0.8)]
    pub scale: f32,

    /// Bin-to-bar assignment
    #[arg(long, value_enum, default_value_t = BarLayout::Linear)]
    pub layout: BarLayout,

    /// Playback volume in percent
    #[arg(long, default_value_t = 50)]
    pub volume: u32,

    /// Seconds of video to render (defaults to the track length)
    #[arg(long)]
    pub length: Option<f64>,

    /// Key press at a point in the video, as SECONDS:KEY (z resume, x pause, c stop)
    #[arg(long = "press", value_name = "SECONDS:KEY")]
    pub presses: Vec<String>,
}
