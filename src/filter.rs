//! The named image filters exposed by the CLI.

use facenorm_vision::{
    resample::{self, Sampling},
    shape, FaceNormalizer, Image, LandmarkPair, Normalized, NormalizerConfig, Point, Sample,
};

/// A transform with its options; every variant maps one image to a new one.
#[derive(Debug, Clone)]
pub enum Filter {
    Shift { delta: Point, sampling: Sampling },
    /// Positive angles turn the `+col` axis toward `+row`, clockwise on
    /// screen. The output grows so nothing is clipped.
    Rotate { angle_radians: f64, sampling: Sampling },
    Scale { factor: f64, sampling: Sampling },
    Normalize {
        config: NormalizerConfig,
        landmarks: LandmarkPair,
    },
}

/// Output of [`Filter::apply`]; normalization keeps its transform report.
#[derive(Debug, Clone)]
pub enum Filtered<T: Sample> {
    Image(Image<T>),
    Normalized(Normalized<T>),
}

impl<T: Sample> Filtered<T> {
    pub fn image(&self) -> &Image<T> {
        match self {
            Filtered::Image(img) => img,
            Filtered::Normalized(n) => &n.image,
        }
    }

    pub fn into_image(self) -> Image<T> {
        match self {
            Filtered::Image(img) => img,
            Filtered::Normalized(n) => n.image,
        }
    }
}

impl Filter {
    pub fn name(&self) -> &'static str {
        match self {
            Filter::Shift { .. } => "shift",
            Filter::Rotate { .. } => "rotate",
            Filter::Scale { .. } => "scale",
            Filter::Normalize { .. } => "normalize",
        }
    }

    pub fn apply<T: Sample>(&self, input: &Image<T>) -> anyhow::Result<Filtered<T>> {
        let out = match self {
            Filter::Shift { delta, sampling } => {
                Filtered::Image(resample::shift(input, delta.row, delta.col, *sampling)?)
            }
            Filter::Rotate {
                angle_radians,
                sampling,
            } => {
                let (height, width) = input.shape();
                let dst_shape = shape::rotated_shape(height, width, *angle_radians)?;
                Filtered::Image(resample::rotate(input, *angle_radians, dst_shape, *sampling)?)
            }
            Filter::Scale { factor, sampling } => {
                Filtered::Image(resample::scale(input, *factor, *sampling)?)
            }
            Filter::Normalize { config, landmarks } => {
                let normalizer = FaceNormalizer::new(config.clone())?;
                Filtered::Normalized(normalizer.normalize_detailed(input, landmarks)?)
            }
        };
        log::debug!(
            "{}: {:?} -> {:?}",
            self.name(),
            input.shape(),
            out.image().shape()
        );
        Ok(out)
    }
}
