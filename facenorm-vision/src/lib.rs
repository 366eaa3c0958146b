//! Landmark-based geometric face normalization.
//!
//! Given a single-channel image and the two eye centres, [`FaceNormalizer`]
//! shifts the eye midpoint to the image centre, rotates the eye axis level,
//! scales to a fixed inter-eye distance and crops a fixed-size window.

pub mod error;
pub mod geometry;
pub mod image;
pub mod interpolation;
pub mod normalize;
pub mod resample;
pub mod shape;

// Re-export commonly used types
pub use error::{Error, NormalizeError, Stage};
pub use geometry::{LandmarkPair, Point};
pub use image::{Image, Sample};
pub use interpolation::InterpolationMode;
pub use normalize::{FaceNormalizer, Normalized, NormalizerConfig, TransformSpec};
pub use resample::Sampling;
