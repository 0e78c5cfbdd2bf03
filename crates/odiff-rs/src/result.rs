use std::borrow::Cow;

use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::apng::{Apng, FrameDelay};
use crate::error::Result;
use crate::options::IgnoreArea;
use crate::overlay::{self, OverlayStyle};
use crate::protocol::{CompareStatus, DiffStats};

/// Outcome of one odiff comparison.
///
/// The stored images are never modified. The `base_image`, `compare_image`
/// and `diff_image` accessors composite the ignore-area overlay onto a fresh
/// copy on every call while `show_ignore_areas_overlay` is set, so flipping
/// the flag (or replacing an image) changes what subsequent reads return.
#[derive(Debug, Clone)]
pub struct DiffResult {
    base_image: DynamicImage,
    compare_image: DynamicImage,
    diff_image: Option<DynamicImage>,
    status: CompareStatus,
    stats: Option<DiffStats>,
    diff_lines: Vec<u32>,
    ignore_areas: Vec<IgnoreArea>,
    /// Render animations on a checkerboard so transparency is visible.
    pub use_checker_transparency: bool,
    /// Draw the ignore areas onto the images returned by the accessors.
    pub show_ignore_areas_overlay: bool,
    pub overlay_style: OverlayStyle,
}

impl DiffResult {
    /// Fails when exactly one of `pixel_count` / `percentage` is given, or
    /// when their presence does not fit `status` (see [`DiffStats::for_status`]).
    pub fn new(
        base_image: DynamicImage,
        compare_image: DynamicImage,
        diff_image: Option<DynamicImage>,
        status: CompareStatus,
        pixel_count: Option<u64>,
        percentage: Option<f64>,
    ) -> Result<Self> {
        let stats = DiffStats::from_parts(pixel_count, percentage)?;
        Ok(Self {
            base_image,
            compare_image,
            diff_image,
            status,
            stats: DiffStats::for_status(status, stats)?,
            diff_lines: Vec::new(),
            ignore_areas: Vec::new(),
            use_checker_transparency: true,
            show_ignore_areas_overlay: true,
            overlay_style: OverlayStyle::default(),
        })
    }

    pub fn with_diff_lines(mut self, diff_lines: Vec<u32>) -> Self {
        self.diff_lines = diff_lines;
        self
    }

    pub fn with_ignore_areas(mut self, ignore_areas: Vec<IgnoreArea>) -> Self {
        self.ignore_areas = ignore_areas;
        self
    }

    pub fn status(&self) -> CompareStatus {
        self.status
    }

    pub fn stats(&self) -> Option<DiffStats> {
        self.stats
    }

    pub fn diff_pixel_count(&self) -> Option<u64> {
        self.stats.map(|s| s.pixel_count)
    }

    pub fn diff_percentage(&self) -> Option<f64> {
        self.stats.map(|s| s.percentage)
    }

    /// 1-based line numbers with differing pixels.
    pub fn diff_lines(&self) -> &[u32] {
        &self.diff_lines
    }

    pub fn ignore_areas(&self) -> &[IgnoreArea] {
        &self.ignore_areas
    }

    /// Overlay sized after the current base image, when it should be shown.
    pub fn ignore_areas_overlay(&self) -> Option<RgbaImage> {
        if !self.show_ignore_areas_overlay {
            return None;
        }
        overlay::create_ignore_areas_overlay(
            self.base_image.dimensions(),
            &self.ignore_areas,
            &self.overlay_style,
        )
    }

    fn presented<'a>(&self, image: &'a DynamicImage) -> Cow<'a, DynamicImage> {
        match self.ignore_areas_overlay() {
            Some(ov) => Cow::Owned(overlay::composite(image, &ov)),
            None => Cow::Borrowed(image),
        }
    }

    pub fn base_image(&self) -> Cow<'_, DynamicImage> {
        self.presented(&self.base_image)
    }

    pub fn compare_image(&self) -> Cow<'_, DynamicImage> {
        self.presented(&self.compare_image)
    }

    pub fn diff_image(&self) -> Option<Cow<'_, DynamicImage>> {
        self.diff_image.as_ref().map(|img| self.presented(img))
    }

    /// Stored images, without any overlay.
    pub fn raw_base_image(&self) -> &DynamicImage {
        &self.base_image
    }

    pub fn raw_compare_image(&self) -> &DynamicImage {
        &self.compare_image
    }

    pub fn raw_diff_image(&self) -> Option<&DynamicImage> {
        self.diff_image.as_ref()
    }

    pub fn set_base_image(&mut self, image: DynamicImage) {
        self.base_image = image;
    }

    pub fn set_compare_image(&mut self, image: DynamicImage) {
        self.compare_image = image;
    }

    pub fn set_diff_image(&mut self, image: Option<DynamicImage>) {
        self.diff_image = image;
    }

    /// Animation cycling through base, compare and (if present) diff image,
    /// as currently presented.
    pub fn create_apng(&self, delay: FrameDelay) -> Result<Apng> {
        let base = self.base_image();
        let compare = self.compare_image();
        let diff = self.diff_image();
        let apng = Apng::from_images(
            [Some(&*base), Some(&*compare), diff.as_deref()],
            delay,
            None,
        )?;
        Ok(apng.with_checker_transparency(self.use_checker_transparency))
    }

    /// Markdown/HTML summary with the default frame delay, see
    /// [`crate::report::markdown::render`].
    pub fn to_markdown(&self) -> Result<String> {
        crate::report::markdown::render(self, FrameDelay::default())
    }
}
