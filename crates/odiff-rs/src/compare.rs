//! The comparison façade: stage inputs, run odiff, decode its answer.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::{debug, warn};

use crate::error::Result;
use crate::options::CompareOptions;
use crate::overlay::OverlayStyle;
use crate::process::{Executable, Runner};
use crate::protocol;
use crate::result::DiffResult;

const SCRATCH_PREFIX: &str = "odiff-rs-";
const STAGED_BASE: &str = "base.png";
const STAGED_COMPARE: &str = "compare.png";
const DEFAULT_DIFF: &str = "diff.png";

/// An input image, either already on disk or held in memory.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Image(DynamicImage),
}

impl ImageSource {
    /// Path odiff should read. In-memory images are written as PNG into `dir`.
    fn stage(self, dir: &Path, name: &str) -> Result<PathBuf> {
        match self {
            Self::Path(path) => Ok(path),
            Self::Image(image) => {
                let path = dir.join(name);
                image.save_with_format(&path, ImageFormat::Png)?;
                debug!(path = %path.display(), "staged in-memory image");
                Ok(path)
            }
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for ImageSource {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(image: DynamicImage) -> Self {
        Self::Image(image)
    }
}

impl From<&DynamicImage> for ImageSource {
    fn from(image: &DynamicImage) -> Self {
        Self::Image(image.clone())
    }
}

/// A file that already sat at the caller's diff path, moved next to it for
/// the duration of a run. It is put back on drop unless [`discard`] is
/// called, so a failed comparison leaves the caller's file as it was.
///
/// [`discard`]: SetAside::discard
struct SetAside {
    original: PathBuf,
    backup: Option<tempfile::TempPath>,
}

impl SetAside {
    fn new(path: &Path) -> Result<Self> {
        let mut backup = None;
        if path.is_file() {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let tmp = tempfile::Builder::new()
                .prefix(".odiff-rs-")
                .suffix(".bak")
                .tempfile_in(dir)?
                .into_temp_path();
            std::fs::rename(path, &tmp)?;
            debug!(
                path = %path.display(),
                backup = %tmp.display(),
                "set aside existing diff image"
            );
            backup = Some(tmp);
        }
        Ok(Self {
            original: path.to_path_buf(),
            backup,
        })
    }

    /// Delete the old file for good.
    fn discard(mut self) {
        drop(self.backup.take());
    }
}

impl Drop for SetAside {
    fn drop(&mut self) {
        if let Some(backup) = self.backup.take() {
            if let Err(e) = std::fs::rename(&backup, &self.original) {
                warn!(path = %self.original.display(), "failed to restore diff image: {e}");
            }
        }
    }
}

fn load_image(path: &Path) -> Result<DynamicImage> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Runs comparisons through a [`Runner`], the odiff executable by default.
#[derive(Debug, Clone, Default)]
pub struct Odiff<R = Executable> {
    runner: R,
    overlay_style: OverlayStyle,
}

impl Odiff<Executable> {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_runner(Executable::new(program))
    }
}

impl<R: Runner> Odiff<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            overlay_style: OverlayStyle::default(),
        }
    }

    /// Style handed to every [`DiffResult`] for drawing ignore areas.
    pub fn overlay_style(mut self, style: OverlayStyle) -> Self {
        self.overlay_style = style;
        self
    }

    /// Compare `base` against `compare`.
    ///
    /// The diff image is written to `diff` when given, otherwise into a
    /// scratch directory that lives only for the duration of this call.
    /// A file already at `diff` only counts as the diff image if odiff
    /// rewrote it. It is removed once the comparison succeeds and restored
    /// when it fails.
    pub fn compare(
        &self,
        base: impl Into<ImageSource>,
        compare: impl Into<ImageSource>,
        diff: Option<&Path>,
        options: &CompareOptions,
    ) -> Result<DiffResult> {
        // Removed on drop, whichever way this function returns.
        let scratch = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
        debug!(dir = %scratch.path().display(), "allocated scratch directory");
        self.compare_in(scratch.path(), base.into(), compare.into(), diff, options)
    }

    fn compare_in(
        &self,
        scratch: &Path,
        base: ImageSource,
        compare: ImageSource,
        diff: Option<&Path>,
        options: &CompareOptions,
    ) -> Result<DiffResult> {
        let base = base.stage(scratch, STAGED_BASE)?;
        let compare = compare.stage(scratch, STAGED_COMPARE)?;
        let (diff, previous) = match diff {
            Some(path) => (path.to_path_buf(), Some(SetAside::new(path)?)),
            None => (scratch.join(DEFAULT_DIFF), None),
        };

        let args = options.to_args(&base, &compare, &diff);
        let output = self.runner.run(&args)?;
        let status = protocol::classify(&output)?;
        let mut parsed = protocol::parse_stdout(&output.stdout)?;
        if !options.output_diff_lines {
            parsed.diff_lines.clear();
        }
        debug!(%status, stats = ?parsed.stats, lines = parsed.diff_lines.len(), "odiff finished");

        let diff_image = if diff.is_file() {
            Some(load_image(&diff)?)
        } else {
            None
        };

        let mut result = DiffResult::new(
            load_image(&base)?,
            load_image(&compare)?,
            diff_image,
            status,
            parsed.stats.map(|s| s.pixel_count),
            parsed.stats.map(|s| s.percentage),
        )?
        .with_diff_lines(parsed.diff_lines)
        .with_ignore_areas(options.ignore.clone());
        result.overlay_style = self.overlay_style;
        if let Some(previous) = previous {
            previous.discard();
        }
        Ok(result)
    }
}

/// Compare two images with the `odiff` executable found on `PATH`.
pub fn odiff(
    base: impl Into<ImageSource>,
    compare: impl Into<ImageSource>,
    diff: Option<&Path>,
    options: &CompareOptions,
) -> Result<DiffResult> {
    Odiff::<Executable>::default().compare(base, compare, diff, options)
}
