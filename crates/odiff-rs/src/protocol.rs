//! Decoding of odiff's `--parsable-stdout` protocol and exit codes.
//!
//! On a classified exit, stdout has the shape
//! `<pixel_count>;<percentage>;<line>,<line>,...` where trailing fields may
//! be empty or missing altogether.

use std::fmt;

use crate::error::{OdiffError, Result};
use crate::process::RunOutput;

/// Outcome of a comparison, bound to the odiff exit code it is reported with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareStatus {
    ImageMatch,
    LayoutDifference,
    PixelDifference,
}

const EXIT_CODES: [(i32, CompareStatus); 3] = [
    (0, CompareStatus::ImageMatch),
    (21, CompareStatus::LayoutDifference),
    (22, CompareStatus::PixelDifference),
];

impl CompareStatus {
    /// Look up the status for an exit code. Anything outside the table is
    /// an execution failure, not a comparison result.
    pub fn from_exit_code(code: i32) -> Option<Self> {
        EXIT_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, status)| *status)
    }

    pub fn exit_code(self) -> i32 {
        EXIT_CODES
            .iter()
            .find(|(_, s)| *s == self)
            .map(|(c, _)| *c)
            .unwrap_or_default()
    }

    /// Human readable label, e.g. "Pixel difference".
    pub fn label(self) -> &'static str {
        match self {
            Self::ImageMatch => "Image match",
            Self::LayoutDifference => "Layout difference",
            Self::PixelDifference => "Pixel difference",
        }
    }

    pub fn is_match(self) -> bool {
        self == Self::ImageMatch
    }
}

impl fmt::Display for CompareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a finished run, surfacing stderr verbatim for unknown exit codes.
pub fn classify(output: &RunOutput) -> Result<CompareStatus> {
    output
        .code
        .and_then(CompareStatus::from_exit_code)
        .ok_or_else(|| OdiffError::Execution {
            code: output.code,
            stderr: output.stderr.clone(),
        })
}

/// Differing pixel count and percentage. odiff reports both or neither.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffStats {
    pub pixel_count: u64,
    pub percentage: f64,
}

impl DiffStats {
    /// Pair up the two optional fields, rejecting a half-present pair.
    pub fn from_parts(pixel_count: Option<u64>, percentage: Option<f64>) -> Result<Option<Self>> {
        match (pixel_count, percentage) {
            (Some(pixel_count), Some(percentage)) => Ok(Some(Self {
                pixel_count,
                percentage,
            })),
            (None, None) => Ok(None),
            (count, pct) => Err(OdiffError::Protocol {
                field: "pixel count/percentage",
                value: format!("{count:?}/{pct:?}"),
                reason: "both must be present or both absent".to_string(),
            }),
        }
    }

    /// Check the stats against the status they were reported with: a pixel
    /// difference carries them, a layout difference or a match never does.
    pub fn for_status(status: CompareStatus, stats: Option<Self>) -> Result<Option<Self>> {
        let reason = match (status, stats) {
            (CompareStatus::PixelDifference, Some(_)) => return Ok(stats),
            (CompareStatus::LayoutDifference | CompareStatus::ImageMatch, None) => {
                return Ok(stats);
            }
            (CompareStatus::PixelDifference, None) => {
                "a pixel difference must report pixel count and percentage".to_string()
            }
            (status, Some(_)) => format!("unexpected for {}", status.label().to_lowercase()),
        };
        Err(OdiffError::Protocol {
            field: "pixel count/percentage",
            value: match stats {
                Some(s) => format!("{};{}", s.pixel_count, s.percentage),
                None => String::new(),
            },
            reason,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedStdout {
    pub stats: Option<DiffStats>,
    /// 1-based line numbers; empty unless `--output-diff-lines` was passed.
    pub diff_lines: Vec<u32>,
}

fn parse_field<T>(field: &'static str, raw: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|e: T::Err| OdiffError::Protocol {
        field,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

pub fn parse_stdout(stdout: &str) -> Result<ParsedStdout> {
    let (count, rest) = stdout.split_once(';').unwrap_or((stdout, ""));
    let (percentage, lines) = rest.split_once(';').unwrap_or((rest, ""));

    let stats = DiffStats::from_parts(
        parse_field("pixel count", count)?,
        parse_field("percentage", percentage)?,
    )?;

    let mut diff_lines = Vec::new();
    for line in lines.split(',') {
        if let Some(n) = parse_field("diff lines", line)? {
            diff_lines.push(n);
        }
    }

    Ok(ParsedStdout { stats, diff_lines })
}
