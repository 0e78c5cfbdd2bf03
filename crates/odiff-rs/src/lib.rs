//! Typed wrapper around the [odiff](https://github.com/dmtrKovalenko/odiff)
//! image comparison executable.
//!
//! odiff does the pixel comparison; this crate builds its command line,
//! decodes its `--parsable-stdout` answer into a [`DiffResult`] and adds
//! presentation helpers: ignore-area overlays and an animated PNG that flips
//! between base, compare and diff image.
//!
//! ```no_run
//! use odiff_rs::{CompareOptions, odiff};
//!
//! let options = CompareOptions::default().ignore([(0, 0, 100, 40)]);
//! let result = odiff("before.png", "after.png", None, &options)?;
//! println!("{}: {:?} pixels", result.status(), result.diff_pixel_count());
//! # Ok::<(), odiff_rs::OdiffError>(())
//! ```

pub mod apng;
pub mod compare;
pub mod error;
pub mod options;
pub mod overlay;
pub mod process;
pub mod protocol;
pub mod report;
pub mod result;

pub use self::apng::{Apng, FrameDelay};
pub use self::compare::{ImageSource, Odiff, odiff};
pub use self::error::{OdiffError, Result};
pub use self::options::{CompareOptions, IgnoreArea};
pub use self::overlay::{OverlayStyle, create_ignore_areas_overlay};
pub use self::process::{Executable, RunOutput, Runner};
pub use self::protocol::{CompareStatus, DiffStats};
pub use self::result::DiffResult;
