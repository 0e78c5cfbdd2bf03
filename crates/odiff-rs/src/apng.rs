//! Animated PNG assembly for flipping between base, compare and diff images.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::Engine;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

use crate::error::{OdiffError, Result};
use crate::overlay;

/// Checkerboard background (like image editors use for transparency) applied
/// to the `<img>` rendering of an animation.
pub const CHECKER_TRANSPARENCY_CSS: &str = concat!(
    "background: -webkit-linear-gradient(45deg, rgba(0, 0, 0, 0.0980392) 25%, transparent 25%, transparent 75%, rgba(0, 0, 0, 0.0980392) 75%, rgba(0, 0, 0, 0.0980392) 0), -webkit-linear-gradient(45deg, rgba(0, 0, 0, 0.0980392) 25%, transparent 25%, transparent 75%, rgba(0, 0, 0, 0.0980392) 75%, rgba(0, 0, 0, 0.0980392) 0), white; ",
    "background: -moz-linear-gradient(45deg, rgba(0, 0, 0, 0.0980392) 25%, transparent 25%, transparent 75%, rgba(0, 0, 0, 0.0980392) 75%, rgba(0, 0, 0, 0.0980392) 0), -moz-linear-gradient(45deg, rgba(0, 0, 0, 0.0980392) 25%, transparent 25%, transparent 75%, rgba(0, 0, 0, 0.0980392) 75%, rgba(0, 0, 0, 0.0980392) 0), white; ",
    "background: linear-gradient(45deg, rgba(0, 0, 0, 0.0980392) 25%, transparent 25%, transparent 75%, rgba(0, 0, 0, 0.0980392) 75%, rgba(0, 0, 0, 0.0980392) 0), linear-gradient(45deg, rgba(0, 0, 0, 0.0980392) 25%, transparent 25%, transparent 75%, rgba(0, 0, 0, 0.0980392) 75%, rgba(0, 0, 0, 0.0980392) 0), white; ",
    "background-repeat: repeat, repeat; ",
    "background-position: 0px 0, 5px 5px; ",
    "-webkit-transform-origin: 0 0 0; ",
    "transform-origin: 0 0 0; ",
    "-webkit-background-origin: padding-box, padding-box; ",
    "background-origin: padding-box, padding-box; ",
    "-webkit-background-clip: border-box, border-box; ",
    "background-clip: border-box, border-box; ",
    "-webkit-background-size: 10px 10px, 10px 10px; ",
    "background-size: 10px 10px, 10px 10px; ",
    "-webkit-box-shadow: none; ",
    "box-shadow: none; ",
    "text-shadow: none; ",
    "-webkit-transition: none; ",
    "-moz-transition: none; ",
    "-o-transition: none; ",
    "transition: none; ",
    "-webkit-transform: scaleX(1) scaleY(1) scaleZ(1); ",
    "transform: scaleX(1) scaleY(1) scaleZ(1);",
);

/// How long each frame is shown: `num / den` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDelay {
    pub num: u16,
    pub den: u16,
}

impl Default for FrameDelay {
    fn default() -> Self {
        Self {
            num: 500,
            den: 1000,
        }
    }
}

/// Place `src` top-left on a transparent `w x h` canvas.
fn pad_to(src: RgbaImage, w: u32, h: u32) -> RgbaImage {
    if src.dimensions() == (w, h) {
        return src;
    }
    let mut canvas = RgbaImage::new(w, h);
    image::imageops::overlay(&mut canvas, &src, 0, 0);
    canvas
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}

/// Encode the present images as APNG frames, in order; `None` entries are
/// skipped. When `overlay` is given it is blended onto a copy of each frame.
///
/// APNG frames must fit the canvas, so differently sized images are anchored
/// top-left on a transparent canvas of the largest width and height.
/// The animation loops forever. If `out_file` is given the bytes are also
/// written there.
pub fn encode_frames<'a, I>(
    images: I,
    delay: FrameDelay,
    overlay: Option<&RgbaImage>,
    out_file: Option<&Path>,
) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = Option<&'a DynamicImage>>,
{
    let frames: Vec<RgbaImage> = images
        .into_iter()
        .flatten()
        .map(|img| match overlay {
            Some(ov) => overlay::composite(img, ov).to_rgba8(),
            None => img.to_rgba8(),
        })
        .collect();
    if frames.is_empty() {
        return Err(OdiffError::EmptyAnimation);
    }

    let width = frames.iter().map(RgbaImage::width).max().unwrap_or_default();
    let height = frames.iter().map(RgbaImage::height).max().unwrap_or_default();
    debug!(frames = frames.len(), width, height, "encoding APNG");

    let mut data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(frames.len() as u32, 0)?;
        encoder.set_frame_delay(delay.num, delay.den)?;
        let mut writer = encoder.write_header()?;
        for frame in frames {
            writer.write_image_data(pad_to(frame, width, height).as_raw())?;
        }
        writer.finish()?;
    }

    if let Some(path) = out_file {
        write_file(path, &data)?;
    }
    Ok(data)
}

/// Encoded animated PNG plus how it should be presented as HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apng {
    data: Vec<u8>,
    pub use_checker_transparency: bool,
}

impl Apng {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            use_checker_transparency: true,
        }
    }

    pub fn from_images<'a, I>(
        images: I,
        delay: FrameDelay,
        overlay: Option<&RgbaImage>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = Option<&'a DynamicImage>>,
    {
        encode_frames(images, delay, overlay, None).map(Self::new)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(std::fs::read(path)?))
    }

    /// Write to `path`, creating missing parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        write_file(path, &self.data)?;
        Ok(path.to_path_buf())
    }

    pub fn with_checker_transparency(mut self, on: bool) -> Self {
        self.use_checker_transparency = on;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// `<img>` tag embedding the animation as a base64 data URI.
    pub fn to_html(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.data);
        let css = if self.use_checker_transparency {
            CHECKER_TRANSPARENCY_CSS
        } else {
            ""
        };
        format!(r#"<img style="border: 1px solid; {css}" src="data:image/apng;base64,{encoded}">"#)
    }
}

impl fmt::Display for Apng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngDecoder;
    use image::{AnimationDecoder, Rgb, RgbImage, Rgba};

    fn solid(w: u32, h: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(color)))
    }

    fn decode_frames(data: &[u8]) -> Vec<RgbaImage> {
        let decoder = PngDecoder::new(std::io::Cursor::new(data)).unwrap();
        assert!(decoder.is_apng().unwrap());
        decoder
            .apng()
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap()
            .into_iter()
            .map(|f| f.into_buffer())
            .collect()
    }

    #[test]
    fn one_frame_per_present_image() {
        let a = solid(8, 6, [255, 0, 0]);
        let b = solid(8, 6, [0, 255, 0]);
        let data = encode_frames([Some(&a), Some(&b)], FrameDelay::default(), None, None).unwrap();

        let frames = decode_frames(&data);
        assert_eq!(frames.len(), 2);
        assert_eq!(*frames[0].get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*frames[1].get_pixel(0, 0), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn absent_frames_are_skipped() {
        let a = solid(8, 6, [255, 0, 0]);
        let b = solid(8, 6, [0, 0, 255]);
        let delay = FrameDelay::default();
        let with_gap = encode_frames([Some(&a), None, Some(&b)], delay, None, None).unwrap();
        let without = encode_frames([Some(&a), Some(&b)], delay, None, None).unwrap();
        assert_eq!(with_gap, without);
    }

    #[test]
    fn frame_delay_and_looping_are_encoded() {
        let a = solid(4, 4, [1, 2, 3]);
        let data = encode_frames(
            [Some(&a), Some(&a)],
            FrameDelay { num: 1, den: 3 },
            None,
            None,
        )
        .unwrap();

        let reader = png::Decoder::new(std::io::Cursor::new(&data)).read_info().unwrap();
        let info = reader.info();
        let actl = info.animation_control.as_ref().unwrap();
        assert_eq!(actl.num_frames, 2);
        assert_eq!(actl.num_plays, 0);
        let fctl = info.frame_control.as_ref().unwrap();
        assert_eq!((fctl.delay_num, fctl.delay_den), (1, 3));
    }

    #[test]
    fn no_frames_is_an_error() {
        let err = encode_frames([None, None], FrameDelay::default(), None, None).unwrap_err();
        assert!(matches!(err, OdiffError::EmptyAnimation));
    }

    #[test]
    fn mixed_sizes_share_the_largest_canvas() {
        let wide = solid(10, 4, [255, 0, 0]);
        let tall = solid(4, 10, [0, 255, 0]);
        let data = encode_frames([Some(&wide), Some(&tall)], FrameDelay::default(), None, None)
            .unwrap();

        let frames = decode_frames(&data);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.dimensions() == (10, 10)));
        assert_eq!(frames[0].get_pixel(9, 9)[3], 0);
        assert_eq!(*frames[1].get_pixel(3, 9), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn overlay_is_applied_to_copies() {
        let base = solid(6, 6, [0, 0, 255]);
        let red = RgbaImage::from_pixel(6, 6, Rgba([255, 0, 0, 255]));
        let delay = FrameDelay::default();

        let expected = encode_frames([Some(&overlay::composite(&base, &red))], delay, None, None)
            .unwrap();
        let with_overlay = Apng::from_images([Some(&base), None], delay, Some(&red)).unwrap();

        assert_eq!(with_overlay.data(), expected.as_slice());
        assert_eq!(base.to_rgb8().get_pixel(0, 0), &Rgb([0, 0, 255]));
    }

    #[test]
    fn out_file_gets_the_same_bytes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("nested/animated.apng");
        let a = solid(3, 3, [9, 9, 9]);
        let data =
            encode_frames([Some(&a), None], FrameDelay::default(), None, Some(&out)).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), data);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = solid(5, 5, [10, 20, 30]);
        let apng = Apng::from_images([Some(&a)], FrameDelay::default(), None).unwrap();

        let saved = apng.save(tmp.path().join("sub/dir/anim.apng")).unwrap();
        assert!(saved.is_file());
        let loaded = Apng::from_file(&saved).unwrap();
        assert_eq!(loaded, apng);
        assert_eq!(std::fs::read(&saved).unwrap(), apng.data());
    }

    #[test]
    fn html_embeds_base64_data() {
        let apng = Apng::new(vec![1, 2, 3]);
        assert_eq!(
            apng.to_string(),
            format!(
                r#"<img style="border: 1px solid; {CHECKER_TRANSPARENCY_CSS}" src="data:image/apng;base64,AQID">"#
            )
        );

        let plain = apng.with_checker_transparency(false);
        assert_eq!(
            plain.to_html(),
            r#"<img style="border: 1px solid; " src="data:image/apng;base64,AQID">"#
        );
    }
}
