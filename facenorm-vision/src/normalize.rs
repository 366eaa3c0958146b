use serde::{Deserialize, Serialize};

use crate::error::{Error, NormalizeError, Stage};
use crate::geometry::{angle_to_horizontal, LandmarkPair, Point};
use crate::image::{Image, Sample};
use crate::interpolation::InterpolationMode;
use crate::resample::{self, Sampling};
use crate::shape::rotated_shape;

pub type Result<T> = std::result::Result<T, NormalizeError>;

/// Geometry of the canonical face crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Inter-eye distance in the output, in pixels.
    pub goal_eye_distance: f64,
    /// `(rows, cols)` of the output.
    pub output_size: (usize, usize),
    /// Row of the eye line in the output, measured from the top edge.
    pub crop_margin: f64,
    /// Background value for pixels with no source content.
    pub fill_value: f64,
    pub interpolation: InterpolationMode,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            goal_eye_distance: 30.0,
            output_size: (100, 100),
            crop_margin: 30.0,
            fill_value: 0.0,
            interpolation: InterpolationMode::Bilinear,
        }
    }
}

impl NormalizerConfig {
    pub fn validate(&self) -> std::result::Result<(), Error> {
        if !(self.goal_eye_distance.is_finite() && self.goal_eye_distance > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "goal_eye_distance must be positive, got {}",
                self.goal_eye_distance
            )));
        }
        let (height, width) = self.output_size;
        if height == 0 || width == 0 {
            return Err(Error::InvalidDimension { height, width });
        }
        if !self.crop_margin.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "crop_margin must be finite, got {}",
                self.crop_margin
            )));
        }
        if !self.fill_value.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "fill_value must be finite, got {}",
                self.fill_value
            )));
        }
        Ok(())
    }

    /// Output position of the eye midpoint: `crop_margin` rows down,
    /// horizontally centred.
    pub fn anchor(&self) -> Point {
        Point::new(self.crop_margin, (self.output_size.1 as f64 - 1.0) / 2.0)
    }

    fn sampling(&self) -> Sampling {
        Sampling::new(self.interpolation, self.fill_value)
    }
}

/// Transform parameters derived for one normalization call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSpec {
    /// Translation applied in the shift stage.
    pub shift: Point,
    /// Angle of the eye axis against the horizontal; the image is rotated by
    /// its negation.
    pub angle_radians: f64,
    pub scale_factor: f64,
    pub rotated_shape: (usize, usize),
    pub scaled_shape: (usize, usize),
}

/// Result of [`FaceNormalizer::normalize_detailed`].
#[derive(Debug, Clone)]
pub struct Normalized<T: Sample> {
    pub image: Image<T>,
    /// Landmarks mapped into `image` coordinates.
    pub landmarks: LandmarkPair,
    pub transform: TransformSpec,
}

/// Image plus landmarks as they flow between stages.
struct Staged<T: Sample> {
    image: Image<T>,
    landmarks: LandmarkPair,
}

/// Runs shift, rotate, scale and crop to produce a canonical face image.
///
/// Holds only its immutable config, so one instance can serve any number
/// of concurrent calls.
#[derive(Debug, Clone)]
pub struct FaceNormalizer {
    config: NormalizerConfig,
}

impl FaceNormalizer {
    pub fn new(config: NormalizerConfig) -> std::result::Result<Self, Error> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Returns the `output_size` canonical crop of `image`.
    pub fn normalize<T: Sample>(&self, image: &Image<T>, landmarks: &LandmarkPair) -> Result<Image<T>> {
        self.normalize_detailed(image, landmarks).map(|n| n.image)
    }

    /// Like [`Self::normalize`] but also reports the output landmarks and the
    /// derived transform.
    pub fn normalize_detailed<T: Sample>(
        &self,
        image: &Image<T>,
        landmarks: &LandmarkPair,
    ) -> Result<Normalized<T>> {
        let sampling = self.config.sampling();

        check_landmarks(landmarks)?;

        // Shift: eye midpoint onto the image centre, the pivot of the rotation.
        let (shifted, delta) = resample::shift_to_center_of_points(image, landmarks, sampling)
            .map_err(NormalizeError::at(Stage::Shift))?;
        let shifted = Staged {
            image: shifted,
            landmarks: landmarks.map(|p| p + delta),
        };
        log::debug!("shifted by {delta}, landmarks now {:?}", shifted.landmarks);

        // Rotate: level the eye axis, growing the buffer so nothing is clipped.
        let (rotated, angle) = self.rotate(shifted).map_err(NormalizeError::at(Stage::Rotate))?;
        log::debug!(
            "rotated by {:.4} rad into {:?}",
            -angle,
            rotated.image.shape()
        );

        // Scale: inter-eye distance measured on the transformed landmarks.
        let rotated_shape = rotated.image.shape();
        let (scaled, factor) = self.scale(rotated).map_err(NormalizeError::at(Stage::Scale))?;
        log::debug!("scaled by {factor:.4} into {:?}", scaled.image.shape());

        let scaled_shape = scaled.image.shape();
        let cropped = self.crop(scaled).map_err(NormalizeError::at(Stage::Crop))?;

        Ok(Normalized {
            image: cropped.image,
            landmarks: cropped.landmarks,
            transform: TransformSpec {
                shift: delta,
                angle_radians: angle,
                scale_factor: factor,
                rotated_shape,
                scaled_shape,
            },
        })
    }

    fn rotate<T: Sample>(&self, staged: Staged<T>) -> std::result::Result<(Staged<T>, f64), Error> {
        let LandmarkPair {
            left_eye,
            right_eye,
        } = staged.landmarks;
        let angle = angle_to_horizontal(left_eye, right_eye)?;
        let src_shape = staged.image.shape();
        let dst_shape = rotated_shape(src_shape.0, src_shape.1, angle)?;

        let image = resample::rotate(&staged.image, -angle, dst_shape, self.config.sampling())?;
        let landmarks = staged
            .landmarks
            .map(|p| resample::rotate_point(p, src_shape, -angle, dst_shape));
        Ok((Staged { image, landmarks }, angle))
    }

    fn scale<T: Sample>(&self, staged: Staged<T>) -> std::result::Result<(Staged<T>, f64), Error> {
        let measured = staged.landmarks.distance();
        let factor = self.config.goal_eye_distance / measured;
        if !(factor.is_finite() && factor > 0.0) {
            return Err(Error::InvalidScale(factor));
        }

        let image = resample::scale(&staged.image, factor, self.config.sampling())?;
        let landmarks = staged.landmarks.map(|p| p * factor);
        Ok((Staged { image, landmarks }, factor))
    }

    fn crop<T: Sample>(&self, staged: Staged<T>) -> std::result::Result<Staged<T>, Error> {
        let origin = staged.landmarks.midpoint() - self.config.anchor();
        let image = resample::crop(
            &staged.image,
            origin,
            self.config.output_size,
            self.config.sampling(),
        )?;
        let landmarks = staged.landmarks.map(|p| p - origin);
        Ok(Staged { image, landmarks })
    }
}

/// Rejects landmarks no stage could use before any pixel is resampled.
///
/// Non-finite points are reported against [`Stage::Shift`], coincident ones
/// against [`Stage::Rotate`], the first stage that needs an eye axis.
fn check_landmarks(landmarks: &LandmarkPair) -> Result<()> {
    let stage = if landmarks.left_eye.is_finite() && landmarks.right_eye.is_finite() {
        Stage::Rotate
    } else {
        Stage::Shift
    };
    landmarks.validate().map_err(NormalizeError::at(stage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gradient(height: usize, width: usize) -> Image<f32> {
        Image::from_fn(height, width, |r, c| (r + c) as f32).unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(FaceNormalizer::new(NormalizerConfig::default()).is_ok());
    }

    #[test]
    fn test_config_validation() {
        let bad_goal = NormalizerConfig {
            goal_eye_distance: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            FaceNormalizer::new(bad_goal),
            Err(Error::InvalidConfig(_))
        ));

        let bad_size = NormalizerConfig {
            output_size: (0, 100),
            ..Default::default()
        };
        assert_eq!(
            FaceNormalizer::new(bad_size).unwrap_err(),
            Error::InvalidDimension {
                height: 0,
                width: 100
            }
        );
    }

    #[test]
    fn test_anchor() {
        let config = NormalizerConfig {
            output_size: (80, 64),
            crop_margin: 20.0,
            ..Default::default()
        };
        assert_eq!(config.anchor(), Point::new(20.0, 31.5));
    }

    #[test]
    fn test_level_eyes_keep_zero_angle() {
        let normalizer = FaceNormalizer::new(NormalizerConfig::default()).unwrap();
        let landmarks = LandmarkPair::new(Point::new(100.0, 50.0), Point::new(100.0, 150.0));
        let out = normalizer
            .normalize_detailed(&gradient(200, 200), &landmarks)
            .unwrap();
        assert_eq!(out.transform.angle_radians, 0.0);
        assert_eq!(out.transform.rotated_shape, (200, 200));
        assert_abs_diff_eq!(out.transform.scale_factor, 0.3, epsilon = 1e-12);
        assert_eq!(out.image.shape(), (100, 100));
    }

    #[test]
    fn test_degenerate_landmarks_abort_in_rotate() {
        let normalizer = FaceNormalizer::new(NormalizerConfig::default()).unwrap();
        let eye = Point::new(50.0, 50.0);
        let err = normalizer
            .normalize(&gradient(100, 100), &LandmarkPair::new(eye, eye))
            .unwrap_err();
        assert_eq!(err.stage, Stage::Rotate);
        assert!(matches!(err.source, Error::DegenerateGeometry { .. }));
    }

    #[test]
    fn test_tiny_scale_aborts_in_scale() {
        let config = NormalizerConfig {
            goal_eye_distance: 0.001,
            ..Default::default()
        };
        let normalizer = FaceNormalizer::new(config).unwrap();
        let landmarks = LandmarkPair::new(Point::new(50.0, 20.0), Point::new(50.0, 80.0));
        let err = normalizer
            .normalize(&gradient(100, 100), &landmarks)
            .unwrap_err();
        assert_eq!(err.stage, Stage::Scale);
        assert!(matches!(err.source, Error::InvalidDimension { .. }));
    }

    #[test]
    fn test_landmarks_checked_before_resampling() {
        let eye = Point::new(50.0, 50.0);
        let err = check_landmarks(&LandmarkPair::new(eye, eye)).unwrap_err();
        assert_eq!(err.stage, Stage::Rotate);
        assert_eq!(err.source, Error::DegenerateGeometry { a: eye, b: eye });

        let nan = Point::new(f64::NAN, 3.0);
        let err = check_landmarks(&LandmarkPair::new(nan, eye)).unwrap_err();
        assert_eq!(err.stage, Stage::Shift);

        assert!(check_landmarks(&LandmarkPair::new(eye, Point::new(50.0, 80.0))).is_ok());
    }

    #[test]
    fn test_nearly_coincident_eyes_abort_in_scale() {
        let normalizer = FaceNormalizer::new(NormalizerConfig::default()).unwrap();
        let landmarks = LandmarkPair::new(Point::new(50.0, 50.0), Point::new(50.0, 50.0 + 1e-9));
        let err = normalizer
            .normalize(&Image::filled(100, 100, 10u8).unwrap(), &landmarks)
            .unwrap_err();
        assert_eq!(err.stage, Stage::Scale);
        assert!(matches!(err.source, Error::InvalidScale(_)));
    }
}
