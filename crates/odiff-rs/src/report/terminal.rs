use image::GenericImageView;

use crate::protocol::CompareStatus;
use crate::result::DiffResult;

/// One status line for a comparison, with ANSI colors.
pub fn format_line(name: &str, result: &DiffResult) -> String {
    match result.status() {
        CompareStatus::ImageMatch => format!("  \x1b[32mMATCH\x1b[0m  {name}"),
        CompareStatus::LayoutDifference => {
            let (bw, bh) = result.raw_base_image().dimensions();
            let (cw, ch) = result.raw_compare_image().dimensions();
            format!("  \x1b[33mLAYOUT\x1b[0m {name}  (dimensions differ: {bw}x{bh} -> {cw}x{ch})")
        }
        CompareStatus::PixelDifference => {
            let mut line = format!("  \x1b[31m DIFF\x1b[0m  {name}");
            if let Some(stats) = result.stats() {
                line.push_str(&format!(
                    "  ({} pixels, {:.2}%)",
                    stats.pixel_count, stats.percentage
                ));
            }
            if !result.diff_lines().is_empty() {
                line.push_str(&format!("  \x1b[2m{} line(s)\x1b[0m", result.diff_lines().len()));
            }
            line
        }
    }
}

pub fn print_line(name: &str, result: &DiffResult) {
    println!("{}", format_line(name, result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn blank(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(w, h))
    }

    #[test]
    fn match_line() {
        let r = DiffResult::new(
            blank(1, 1),
            blank(1, 1),
            None,
            CompareStatus::ImageMatch,
            None,
            None,
        )
        .unwrap();
        assert_eq!(format_line("a.png", &r), "  \x1b[32mMATCH\x1b[0m  a.png");
    }

    #[test]
    fn layout_line_reports_dimensions() {
        let r = DiffResult::new(
            blank(400, 300),
            blank(300, 400),
            None,
            CompareStatus::LayoutDifference,
            None,
            None,
        )
        .unwrap();
        assert!(format_line("x", &r).contains("400x300 -> 300x400"));
    }

    #[test]
    fn diff_line_reports_stats() {
        let r = DiffResult::new(
            blank(2, 2),
            blank(2, 2),
            None,
            CompareStatus::PixelDifference,
            Some(7789),
            Some(1.167766),
        )
        .unwrap()
        .with_diff_lines(vec![13, 14]);
        let line = format_line("x", &r);
        assert!(line.contains("(7789 pixels, 1.17%)"));
        assert!(line.contains("2 line(s)"));
    }
}
