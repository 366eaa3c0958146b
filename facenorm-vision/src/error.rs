use std::fmt;

use crate::geometry::Point;

/// Precondition violations raised by the geometry and resampling primitives.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The two reference points coincide, so no angle or distance is defined.
    #[error("degenerate geometry: points {a} and {b} do not define a direction")]
    DegenerateGeometry { a: Point, b: Point },

    /// An image or computed shape has a non-positive side.
    #[error("invalid dimension {height}x{width}")]
    InvalidDimension { height: usize, width: usize },

    /// A scale factor that is not strictly positive and finite.
    #[error("invalid scale factor {0}")]
    InvalidScale(f64),

    /// Pixel buffer length does not match `height * width`.
    #[error("buffer holds {actual} samples but the image needs {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage of [`crate::FaceNormalizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Shift,
    Rotate,
    Scale,
    Crop,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Shift => "shift",
            Stage::Rotate => "rotate",
            Stage::Scale => "scale",
            Stage::Crop => "crop",
        };
        f.write_str(name)
    }
}

/// A failed normalization: the stage that aborted and the violated invariant.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{stage} stage failed: {source}")]
pub struct NormalizeError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl NormalizeError {
    pub(crate) fn at(stage: Stage) -> impl FnOnce(Error) -> Self {
        move |source| Self { stage, source }
    }
}
