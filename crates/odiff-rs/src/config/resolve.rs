use std::path::PathBuf;

use anyhow::{Context, Result};
use odiff_rs::process::DEFAULT_PROGRAM;
use odiff_rs::{CompareOptions, FrameDelay, IgnoreArea, OverlayStyle};

use super::{Config, load, parse_hex_color, validate_threshold};

fn parse_threshold(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    validate_threshold(v)
}

fn parse_ignore(s: &str) -> Result<IgnoreArea, String> {
    s.parse().map_err(|e: odiff_rs::OdiffError| e.to_string())
}

fn parse_color(s: &str) -> Result<String, String> {
    parse_hex_color(s).map(|_| s.to_string())
}

/// Comparison flags from the command line. Boolean flags can only switch an
/// option on; a non-empty `--ignore` list replaces the configured one.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct CliOverrides {
    /// Path to the odiff executable (overrides config and env)
    #[arg(long)]
    pub binary: Option<PathBuf>,
    /// Do not count antialiased pixels as different
    #[arg(long)]
    pub antialiasing: bool,
    /// Color of differing pixels in the diff image (#RRGGBB)
    #[arg(long, value_parser = parse_color)]
    pub diff_color: Option<String>,
    /// Diff image shows only changed pixels over transparency
    #[arg(long)]
    pub diff_mask: bool,
    /// Report a layout difference without comparing when dimensions differ
    #[arg(long)]
    pub fail_on_layout: bool,
    /// Region to ignore, repeatable
    #[arg(long, value_name = "X1:Y1-X2:Y2", value_parser = parse_ignore)]
    pub ignore: Vec<IgnoreArea>,
    /// Report the line numbers that contain differing pixels
    #[arg(long)]
    pub output_diff_lines: bool,
    /// Use less memory at the cost of speed
    #[arg(long)]
    pub reduce_ram_usage: bool,
    /// Color difference threshold (0.0-1.0), lower is more precise
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,
    /// Do not draw ignore areas onto the rendered images
    #[arg(long)]
    pub no_overlay: bool,
    /// Render the animation without a checkerboard background
    #[arg(long)]
    pub no_checker: bool,
}

/// Environment layer (`ODIFF_RS_BINARY`, `ODIFF_RS_THRESHOLD`).
#[derive(Debug, Default)]
pub struct EnvOverrides {
    pub binary: Option<PathBuf>,
    pub threshold: Option<f64>,
}

impl EnvOverrides {
    pub fn from_env() -> Result<Self> {
        let binary = std::env::var_os("ODIFF_RS_BINARY").map(PathBuf::from);
        let threshold = std::env::var("ODIFF_RS_THRESHOLD")
            .ok()
            .map(|v| v.parse::<f64>())
            .transpose()
            .context("ODIFF_RS_THRESHOLD must be a valid float")?;
        Ok(Self { binary, threshold })
    }
}

/// Fully resolved settings after CLI > env > file > defaults merge.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub binary: PathBuf,
    pub options: CompareOptions,
    pub delay: FrameDelay,
    pub checker_transparency: bool,
    pub show_overlay: bool,
    pub overlay_style: OverlayStyle,
}

impl ResolvedConfig {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        let file = load()?;
        let env = EnvOverrides::from_env()?;
        Self::from_layers(file, env, cli)
    }

    pub fn from_layers(file: Config, env: EnvOverrides, cli: CliOverrides) -> Result<Self> {
        let binary = cli
            .binary
            .or(env.binary)
            .or(file.odiff.binary)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM));

        let threshold = cli
            .threshold
            .or(env.threshold)
            .or(file.compare.threshold)
            .unwrap_or(odiff_rs::options::DEFAULT_THRESHOLD);
        validate_threshold(threshold).map_err(|e| anyhow::anyhow!("{e}"))?;

        let defaults = CompareOptions::default();
        let compare = file.compare;
        let options = CompareOptions {
            antialiasing: cli.antialiasing || compare.antialiasing,
            diff_color: cli
                .diff_color
                .or(compare.diff_color)
                .unwrap_or(defaults.diff_color),
            diff_mask: cli.diff_mask || compare.diff_mask,
            fail_on_layout: cli.fail_on_layout || compare.fail_on_layout,
            ignore: if cli.ignore.is_empty() {
                compare.ignore
            } else {
                cli.ignore
            },
            output_diff_lines: cli.output_diff_lines || compare.output_diff_lines,
            reduce_ram_usage: cli.reduce_ram_usage || compare.reduce_ram_usage,
            threshold,
        };

        let default_delay = FrameDelay::default();
        let delay = FrameDelay {
            num: file.apng.delay_num.unwrap_or(default_delay.num),
            den: file.apng.delay_den.unwrap_or(default_delay.den),
        };

        let default_style = OverlayStyle::default();
        let overlay_style = OverlayStyle {
            color: match &file.overlay.color {
                Some(c) => parse_hex_color(c).map_err(|e| anyhow::anyhow!("overlay.color: {e}"))?,
                None => default_style.color,
            },
            border_opacity: file
                .overlay
                .border_opacity
                .unwrap_or(default_style.border_opacity),
            fill_opacity: file
                .overlay
                .fill_opacity
                .unwrap_or(default_style.fill_opacity),
        };

        Ok(Self {
            binary,
            options,
            delay,
            checker_transparency: !cli.no_checker && file.apng.checker_transparency.unwrap_or(true),
            show_overlay: !cli.no_overlay && file.overlay.show.unwrap_or(true),
            overlay_style,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse;

    #[test]
    fn defaults_without_any_layer() {
        let r = ResolvedConfig::from_layers(
            Config::default(),
            EnvOverrides::default(),
            CliOverrides::default(),
        )
        .unwrap();
        assert_eq!(r.binary, PathBuf::from("odiff"));
        assert_eq!(r.options, CompareOptions::default());
        assert_eq!(r.delay, FrameDelay::default());
        assert!(r.checker_transparency);
        assert!(r.show_overlay);
        assert_eq!(r.overlay_style, OverlayStyle::default());
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file =
            parse("[odiff]\nbinary = \"/file/odiff\"\n[compare]\nthreshold = 0.3\n").unwrap();
        let env = EnvOverrides {
            binary: Some(PathBuf::from("/env/odiff")),
            threshold: Some(0.2),
        };
        let r = ResolvedConfig::from_layers(file.clone(), env, CliOverrides::default()).unwrap();
        assert_eq!(r.binary, PathBuf::from("/env/odiff"));
        assert_eq!(r.options.threshold, 0.2);

        let cli = CliOverrides {
            binary: Some(PathBuf::from("/cli/odiff")),
            threshold: Some(0.05),
            ..Default::default()
        };
        let r = ResolvedConfig::from_layers(file.clone(), EnvOverrides::default(), cli).unwrap();
        assert_eq!(r.binary, PathBuf::from("/cli/odiff"));
        assert_eq!(r.options.threshold, 0.05);

        let r = ResolvedConfig::from_layers(file, EnvOverrides::default(), CliOverrides::default())
            .unwrap();
        assert_eq!(r.binary, PathBuf::from("/file/odiff"));
        assert_eq!(r.options.threshold, 0.3);
    }

    #[test]
    fn env_threshold_is_validated() {
        let env = EnvOverrides {
            binary: None,
            threshold: Some(2.0),
        };
        assert!(
            ResolvedConfig::from_layers(Config::default(), env, CliOverrides::default()).is_err()
        );
    }

    #[test]
    fn cli_ignore_replaces_file_ignore() {
        let file = parse("[compare]\nignore = [\"0:0-1:1\"]\ndiff_mask = true\n").unwrap();
        let r = ResolvedConfig::from_layers(
            file.clone(),
            EnvOverrides::default(),
            CliOverrides::default(),
        )
        .unwrap();
        assert_eq!(r.options.ignore, vec![IgnoreArea::new(0, 0, 1, 1)]);
        assert!(r.options.diff_mask);

        let cli = CliOverrides {
            ignore: vec![IgnoreArea::new(5, 5, 9, 9)],
            ..Default::default()
        };
        let r = ResolvedConfig::from_layers(file, EnvOverrides::default(), cli).unwrap();
        assert_eq!(r.options.ignore, vec![IgnoreArea::new(5, 5, 9, 9)]);
    }

    #[test]
    fn presentation_settings() {
        let file = parse(concat!(
            "[apng]\ndelay_num = 1\ndelay_den = 2\n",
            "[overlay]\ncolor = \"#0000ff\"\nfill_opacity = 0.0\n",
        ))
        .unwrap();
        let cli = CliOverrides {
            no_checker: true,
            no_overlay: true,
            ..Default::default()
        };
        let r = ResolvedConfig::from_layers(file, EnvOverrides::default(), cli).unwrap();
        assert_eq!(r.delay, FrameDelay { num: 1, den: 2 });
        assert_eq!(r.overlay_style.color, image::Rgb([0, 0, 255]));
        assert_eq!(r.overlay_style.fill_opacity, 0.0);
        assert!(!r.checker_transparency);
        assert!(!r.show_overlay);
    }

    #[test]
    fn cli_value_parsers() {
        assert!(parse_threshold("0.5").is_ok());
        assert!(parse_threshold("5").is_err());
        assert_eq!(parse_ignore("1:2-3:4").unwrap(), IgnoreArea::new(1, 2, 3, 4));
        assert!(parse_ignore("1,2,3,4").is_err());
        assert!(parse_color("#abcdef").is_ok());
        assert!(parse_color("blue").is_err());
    }
}
