use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::bars::BarLayout;
use crate::audio::window::WindowFunction;
use crate::cli::Cli;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub bars: BarsConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_codec")]
    pub codec: String,
    #[serde(default = "default_pix_fmt")]
    pub pix_fmt: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    #[serde(default)]
    pub window: WindowFunction,
}

#[derive(Debug, Deserialize)]
pub struct BarsConfig {
    #[serde(default = "default_bar_count")]
    pub count: usize,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub layout: BarLayout,
    #[serde(default = "default_bar_width")]
    pub width: f32,
    #[serde(default = "default_bar_spacing")]
    pub spacing: f32,
    #[serde(default = "default_bar_color")]
    pub color: [u8; 3],
}

#[derive(Debug, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_font")]
    pub font: PathBuf,
    #[serde(default = "default_background")]
    pub background: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_volume")]
    pub volume: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            crf: default_crf(),
            codec: default_codec(),
            pix_fmt: default_pix_fmt(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
            window: WindowFunction::default(),
        }
    }
}

impl Default for BarsConfig {
    fn default() -> Self {
        Self {
            count: default_bar_count(),
            scale: default_scale(),
            layout: BarLayout::default(),
            width: default_bar_width(),
            spacing: default_bar_spacing(),
            color: default_bar_color(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            font: default_font(),
            background: default_background(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
        }
    }
}

fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }
fn default_fps() -> u32 { 60 }
fn default_crf() -> u32 { 18 }
fn default_codec() -> String { "libx264".into() }
fn default_pix_fmt() -> String { "yuv420p".into() }
fn default_frame_size() -> usize { 4096 }
fn default_bar_count() -> usize { 150 }
fn default_scale() -> f32 { 0.8 }
fn default_bar_width() -> f32 { 5.0 }
fn default_bar_spacing() -> f32 { 3.0 }
fn default_bar_color() -> [u8; 3] { [0, 0, 255] }
fn default_font() -> PathBuf { "NotoSans-VariableFont_wdth,wght.ttf".into() }
fn default_background() -> PathBuf { "bg.png".into() }
fn default_volume() -> u32 { 50 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::warn!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

/// `--config`, else `./spectra.toml`, else the per-user config file.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("spectra.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("spectra").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("spectra").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

impl Config {
    /// Config values apply only where the CLI is still at its default.
    pub fn merge_into(self, cli: &mut Cli) {
        let defaults = Config::default();

        if cli.width == defaults.output.width { cli.width = self.output.width; }
        if cli.height == defaults.output.height { cli.height = self.output.height; }
        if cli.fps == defaults.output.fps { cli.fps = self.output.fps; }
        if cli.crf == defaults.output.crf { cli.crf = self.output.crf; }
        if cli.codec == defaults.output.codec { cli.codec = self.output.codec; }
        if cli.pix_fmt == defaults.output.pix_fmt { cli.pix_fmt = self.output.pix_fmt; }
        if cli.frame_size == defaults.analysis.frame_size { cli.frame_size = self.analysis.frame_size; }
        if cli.window == defaults.analysis.window { cli.window = self.analysis.window; }
        if cli.bars == defaults.bars.count { cli.bars = self.bars.count; }
        if cli.scale == defaults.bars.scale { cli.scale = self.bars.scale; }
        if cli.layout == defaults.bars.layout { cli.layout = self.bars.layout; }
        if cli.font == defaults.assets.font { cli.font = self.assets.font; }
        if cli.background == defaults.assets.background { cli.background = self.assets.background; }
        if cli.volume == defaults.playback.volume { cli.volume = self.playback.volume; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_config_uses_reference_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.output.width, 1280);
        assert_eq!(config.output.fps, 60);
        assert_eq!(config.analysis.frame_size, 4096);
        assert_eq!(config.analysis.window, WindowFunction::Hamming);
        assert_eq!(config.bars.count, 150);
        assert_eq!(config.bars.scale, 0.8);
        assert_eq!(config.bars.layout, BarLayout::Linear);
        assert_eq!(config.playback.volume, 50);
    }

    #[test]
    fn parses_sections() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            frame_size = 2048
            window = "hann"

            [bars]
            count = 64
            layout = "log"
            color = [255, 0, 0]
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.frame_size, 2048);
        assert_eq!(config.analysis.window, WindowFunction::Hann);
        assert_eq!(config.bars.count, 64);
        assert_eq!(config.bars.layout, BarLayout::Log);
        assert_eq!(config.bars.color, [255, 0, 0]);
        assert_eq!(config.bars.scale, 0.8);
    }

    #[test]
    fn cli_flags_win_over_config() {
        let mut cli = Cli::parse_from(["spectra", "song.flac", "--bars", "40"]);
        let config: Config = toml::from_str(
            r#"
            [bars]
            count = 64
            scale = 2.0
            "#,
        )
        .unwrap();
        config.merge_into(&mut cli);
        assert_eq!(cli.bars, 40);
        assert_eq!(cli.scale, 2.0);
        assert_eq!(cli.frame_size, 4096);
    }

    #[test]
    fn cli_defaults_match_config_defaults() {
        let cli = Cli::parse_from(["spectra", "song.flac"]);
        let defaults = Config::default();
        assert_eq!(cli.width, defaults.output.width);
        assert_eq!(cli.height, defaults.output.height);
        assert_eq!(cli.fps, defaults.output.fps);
        assert_eq!(cli.frame_size, defaults.analysis.frame_size);
        assert_eq!(cli.bars, defaults.bars.count);
        assert_eq!(cli.scale, defaults.bars.scale);
        assert_eq!(cli.font, defaults.assets.font);
        assert_eq!(cli.volume, defaults.playback.volume);
    }
}
