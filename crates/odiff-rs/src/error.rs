use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OdiffError {
    /// The executable could not be started at all (missing, not executable, ...).
    #[error("Failed to launch {}: {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The executable ran but exited with a code outside the known statuses.
    /// `code` is `None` when the process was terminated by a signal.
    #[error("Error calling odiff executable:\n{stderr}")]
    Execution { code: Option<i32>, stderr: String },

    /// stdout did not have the `<count>;<percentage>;<lines>` shape.
    #[error("Unexpected odiff output in {field} field ({value:?}): {reason}")]
    Protocol {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid ignore area {0:?}, expected `x1:y1-x2:y2`")]
    InvalidIgnoreArea(String),

    #[error("Cannot build an animation without frames")]
    EmptyAnimation,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("APNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = OdiffError> = std::result::Result<T, E>;
