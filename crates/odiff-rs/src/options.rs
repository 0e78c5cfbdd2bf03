use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::OdiffError;

pub const DEFAULT_DIFF_COLOR: &str = "#FF0000";
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Axis-aligned rectangle (inclusive corners, source-image pixels) excluded
/// from the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct IgnoreArea {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl IgnoreArea {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// `x1:y1-x2:y2`, the region syntax of odiff's `--ignore`.
    pub fn to_region_str(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IgnoreArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}:{}", self.x1, self.y1, self.x2, self.y2)
    }
}

impl From<(u32, u32, u32, u32)> for IgnoreArea {
    fn from((x1, y1, x2, y2): (u32, u32, u32, u32)) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<[u32; 4]> for IgnoreArea {
    fn from([x1, y1, x2, y2]: [u32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl FromStr for IgnoreArea {
    type Err = OdiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OdiffError::InvalidIgnoreArea(s.to_string());
        let point = |p: &str| -> Result<(u32, u32), OdiffError> {
            let (x, y) = p.split_once(':').ok_or_else(invalid)?;
            Ok((
                x.trim().parse().map_err(|_| invalid())?,
                y.trim().parse().map_err(|_| invalid())?,
            ))
        };
        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let (x1, y1) = point(start)?;
        let (x2, y2) = point(end)?;
        Ok(Self::new(x1, y1, x2, y2))
    }
}

impl TryFrom<String> for IgnoreArea {
    type Error = OdiffError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Named options of one comparison. `Default` mirrors odiff's own defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Do not count antialiased pixels as different.
    pub antialiasing: bool,
    /// Hex color used to paint differing pixels, e.g. `#cd2cc9`.
    pub diff_color: String,
    /// Diff image holds only the changed pixels over transparency.
    pub diff_mask: bool,
    /// Stop early with a layout difference when dimensions differ.
    pub fail_on_layout: bool,
    pub ignore: Vec<IgnoreArea>,
    /// Report the 1-based line numbers containing differing pixels.
    pub output_diff_lines: bool,
    /// Lower peak memory at the cost of speed.
    pub reduce_ram_usage: bool,
    /// Color distance threshold in 0..=1; lower is more precise.
    pub threshold: f64,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            antialiasing: false,
            diff_color: DEFAULT_DIFF_COLOR.to_string(),
            diff_mask: false,
            fail_on_layout: false,
            ignore: Vec::new(),
            output_diff_lines: false,
            reduce_ram_usage: false,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl CompareOptions {
    /// Set the ignore areas from anything convertible, e.g. raw 4-tuples.
    pub fn ignore<I, A>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<IgnoreArea>,
    {
        self.ignore = areas.into_iter().map(Into::into).collect();
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn diff_color(mut self, color: impl Into<String>) -> Self {
        self.diff_color = color.into();
        self
    }

    pub fn antialiasing(mut self, on: bool) -> Self {
        self.antialiasing = on;
        self
    }

    pub fn diff_mask(mut self, on: bool) -> Self {
        self.diff_mask = on;
        self
    }

    pub fn fail_on_layout(mut self, on: bool) -> Self {
        self.fail_on_layout = on;
        self
    }

    pub fn output_diff_lines(mut self, on: bool) -> Self {
        self.output_diff_lines = on;
        self
    }

    pub fn reduce_ram_usage(mut self, on: bool) -> Self {
        self.reduce_ram_usage = on;
        self
    }

    /// Argument vector for odiff, in a fixed order: `--parsable-stdout`,
    /// boolean flags, value flags, then the base/compare/diff paths.
    pub fn to_args(&self, base: &Path, compare: &Path, diff: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--parsable-stdout".into()];

        for (on, flag) in [
            (self.antialiasing, "--antialiasing"),
            (self.diff_mask, "--diff-mask"),
            (self.fail_on_layout, "--fail-on-layout"),
            (self.output_diff_lines, "--output-diff-lines"),
            (self.reduce_ram_usage, "--reduce-ram-usage"),
        ] {
            if on {
                args.push(flag.into());
            }
        }

        args.push(format!("--diff-color={}", self.diff_color).into());
        if !self.ignore.is_empty() {
            let regions: Vec<String> = self.ignore.iter().map(IgnoreArea::to_region_str).collect();
            args.push(format!("--ignore={}", regions.join(",")).into());
        }
        args.push(format!("--threshold={}", self.threshold).into());

        args.extend([base, compare, diff].map(|p| p.as_os_str().to_os_string()));
        args
    }
}
