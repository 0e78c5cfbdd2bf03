//! Markdown/HTML summary of a [`DiffResult`], suitable for notebooks or
//! review pages that render inline HTML.

use crate::apng::FrameDelay;
use crate::error::Result;
use crate::result::DiffResult;

pub const IDENTICAL: &str = "Images are identical.";

fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

fn format_lines(lines: &[u32]) -> String {
    let joined: Vec<String> = lines.iter().map(u32::to_string).collect();
    format!("[{}]", joined.join(", "))
}

/// `"Images are identical."` for a match, otherwise a status table followed
/// by the embedded base/compare/diff animation.
pub fn render(result: &DiffResult, delay: FrameDelay) -> Result<String> {
    if result.status().is_match() {
        return Ok(IDENTICAL.to_string());
    }

    let mut lines = vec![
        "|Meaning|Value|".to_string(),
        "|-------|-----|".to_string(),
        format!("|Status|{}|", result.status()),
        format!("|Diff Pixel Count|{}|", or_na(result.diff_pixel_count())),
        format!(
            "|Diff Percentage|{}|",
            or_na(result.diff_percentage().map(|p| format!("{p:.2}%")))
        ),
    ];
    if !result.diff_lines().is_empty() {
        lines.push(format!("|Diff Lines|{}|", format_lines(result.diff_lines())));
    }

    let apng = result.create_apng(delay)?;
    lines.push(format!("\n<br>{apng}\n"));
    Ok(lines.join("\n"))
}
