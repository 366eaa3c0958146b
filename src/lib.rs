pub mod config;
pub mod filter;
pub mod io;
pub mod landmarks;

// Re-export vision types for convenience
pub use facenorm_vision::{
    geometry, resample, FaceNormalizer, Image, InterpolationMode, LandmarkPair, NormalizeError,
    NormalizerConfig, Point,
};
