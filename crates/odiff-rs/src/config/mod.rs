pub mod resolve;
pub mod template;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use image::Rgb;
use odiff_rs::IgnoreArea;
use serde::Deserialize;

pub use self::resolve::{CliOverrides, ResolvedConfig};
pub use self::template::{config_file_exists, write_template};

pub(crate) const CONFIG_DIR: &str = ".odiff";
const CONFIG_FILE: &str = "config.toml";

/// Location of the odiff executable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BinaryConfig {
    #[serde(default)]
    pub binary: Option<PathBuf>,
}

/// File-level defaults for every comparison option.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareConfig {
    #[serde(default)]
    pub antialiasing: bool,
    #[serde(default)]
    pub diff_color: Option<String>,
    #[serde(default)]
    pub diff_mask: bool,
    #[serde(default)]
    pub fail_on_layout: bool,
    /// Regions as `"x1:y1-x2:y2"` strings.
    #[serde(default)]
    pub ignore: Vec<IgnoreArea>,
    #[serde(default)]
    pub output_diff_lines: bool,
    #[serde(default)]
    pub reduce_ram_usage: bool,
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApngConfig {
    #[serde(default)]
    pub delay_num: Option<u16>,
    #[serde(default)]
    pub delay_den: Option<u16>,
    #[serde(default)]
    pub checker_transparency: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverlayConfig {
    /// `#RRGGBB`
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub border_opacity: Option<f32>,
    #[serde(default)]
    pub fill_opacity: Option<f32>,
    #[serde(default)]
    pub show: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub odiff: BinaryConfig,
    #[serde(default)]
    pub compare: CompareConfig,
    #[serde(default)]
    pub apng: ApngConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

pub fn validate_threshold(v: f64) -> Result<f64, String> {
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("threshold must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

pub fn validate_opacity(name: &str, v: f32) -> Result<f32, String> {
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("{name} must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

/// Parse `#RRGGBB` (the leading `#` is optional).
pub fn parse_hex_color(s: &str) -> Result<Rgb<u8>, String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("expected a #RRGGBB color, got {s:?}"));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

impl Config {
    /// Validate semantic constraints that serde cannot express.
    fn validate(&self) -> Result<()> {
        if let Some(t) = self.compare.threshold {
            validate_threshold(t).map_err(|e| anyhow::anyhow!("compare.{e}"))?;
        }
        if let Some(color) = &self.compare.diff_color {
            parse_hex_color(color).map_err(|e| anyhow::anyhow!("compare.diff_color: {e}"))?;
        }
        if let Some(color) = &self.overlay.color {
            parse_hex_color(color).map_err(|e| anyhow::anyhow!("overlay.color: {e}"))?;
        }
        if let Some(v) = self.overlay.border_opacity {
            validate_opacity("overlay.border_opacity", v).map_err(|e| anyhow::anyhow!(e))?;
        }
        if let Some(v) = self.overlay.fill_opacity {
            validate_opacity("overlay.fill_opacity", v).map_err(|e| anyhow::anyhow!(e))?;
        }
        if self.apng.delay_den == Some(0) {
            bail!("apng.delay_den must be > 0");
        }
        Ok(())
    }
}

pub fn parse(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn config_path() -> PathBuf {
    Path::new(CONFIG_DIR).join(CONFIG_FILE)
}

/// Load `.odiff/config.toml`. A missing file yields the defaults.
pub fn load() -> Result<Config> {
    let path = config_path();
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
