use std::path::Path;

use anyhow::{Context, Result};
use odiff_rs::Odiff;
use odiff_rs::report::{markdown, terminal};
use tracing::info;

use crate::config::ResolvedConfig;

pub const EXIT_MATCH: i32 = 0;
pub const EXIT_DIFFERENT: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Output files requested next to the comparison itself.
pub struct Outputs<'a> {
    pub diff: Option<&'a Path>,
    pub apng: Option<&'a Path>,
    pub markdown: Option<&'a Path>,
}

/// `odiff-rs compare`: run odiff, print a status line, write the
/// requested artifacts. Returns [`EXIT_MATCH`] or [`EXIT_DIFFERENT`].
pub fn compare(
    config: &ResolvedConfig,
    base: &Path,
    compare: &Path,
    out: Outputs<'_>,
) -> Result<i32> {
    let odiff = Odiff::new(&config.binary).overlay_style(config.overlay_style);
    let mut result = odiff
        .compare(base, compare, out.diff, &config.options)
        .with_context(|| {
            format!(
                "Failed to compare {} with {}",
                base.display(),
                compare.display()
            )
        })?;
    result.use_checker_transparency = config.checker_transparency;
    result.show_ignore_areas_overlay = config.show_overlay;

    let name = format!("{} vs {}", base.display(), compare.display());
    terminal::print_line(&name, &result);

    if let Some(path) = out.apng {
        let apng = result
            .create_apng(config.delay)
            .context("Failed to build animated diff")?;
        apng.save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "animated diff written");
    }

    if let Some(path) = out.markdown {
        let summary =
            markdown::render(&result, config.delay).context("Failed to render summary")?;
        write_with_parents(path, summary.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }

    Ok(if result.status().is_match() {
        EXIT_MATCH
    } else {
        EXIT_DIFFERENT
    })
}

fn write_with_parents(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)
}

/// Exit code for a `compare` outcome. Errors are printed and map to
/// [`EXIT_ERROR`].
pub fn exit_code(outcome: Result<i32>) -> i32 {
    outcome.unwrap_or_else(|e| {
        eprintln!("Error: {e:?}");
        EXIT_ERROR
    })
}
