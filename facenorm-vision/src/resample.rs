//! Shift, rotation, scale and crop on a shared backward-mapping core.
//!
//! Each operation maps every destination pixel back to a source coordinate
//! and samples it with [`interpolate`]. Coordinates that fall outside the
//! source yield the fill value, which is a designed degradation and never an
//! error. Inputs are validated before a destination buffer is allocated.

use crate::error::{Error, Result};
use crate::geometry::{LandmarkPair, Point};
use crate::image::{Image, Sample};
use crate::interpolation::{interpolate, InterpolationMode};
use crate::shape::scaled_shape;

/// Sampling options shared by all resampling operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub mode: InterpolationMode,
    /// Background value for destination pixels with no source.
    pub fill: f64,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            mode: InterpolationMode::Bilinear,
            fill: 0.0,
        }
    }
}

impl Sampling {
    pub fn new(mode: InterpolationMode, fill: f64) -> Self {
        Self { mode, fill }
    }
}

/// Fills a `(height, width)` destination by sampling `src` at `map(row, col)`.
fn remap<T: Sample>(
    src: &Image<T>,
    (height, width): (usize, usize),
    sampling: Sampling,
    map: impl Fn(Point) -> Point,
) -> Result<Image<T>> {
    Image::from_fn(height, width, |r, c| {
        let p = map(Point::new(r as f64, c as f64));
        T::from_f64(interpolate(src, p, sampling.mode, sampling.fill))
    })
}

/// Translates `src` by `(delta_row, delta_col)`: `dst[r, c] = src[r - dr, c - dc]`.
///
/// The destination keeps the source shape, content moved past the border is
/// dropped.
pub fn shift<T: Sample>(
    src: &Image<T>,
    delta_row: f64,
    delta_col: f64,
    sampling: Sampling,
) -> Result<Image<T>> {
    let delta = Point::new(delta_row, delta_col);
    if !delta.is_finite() {
        return Err(Error::InvalidConfig(format!("shift delta {delta} is not finite")));
    }
    remap(src, src.shape(), sampling, |p| p - delta)
}

/// Shifts `src` so the midpoint of `landmarks` lands on the image centre.
///
/// Returns the shifted image and the applied `(delta_row, delta_col)`.
pub fn shift_to_center_of_points<T: Sample>(
    src: &Image<T>,
    landmarks: &LandmarkPair,
    sampling: Sampling,
) -> Result<(Image<T>, Point)> {
    let delta = src.center() - landmarks.midpoint();
    let dst = shift(src, delta.row, delta.col, sampling)?;
    Ok((dst, delta))
}

/// Rotates `src` by `angle` radians about its centre into a `dst_shape`
/// buffer, the rotated content centred in it.
///
/// `dst_shape` normally comes from [`crate::shape::rotated_shape`] so that
/// nothing is clipped. The direction matches [`Point::rotated_about`].
pub fn rotate<T: Sample>(
    src: &Image<T>,
    angle: f64,
    dst_shape: (usize, usize),
    sampling: Sampling,
) -> Result<Image<T>> {
    let (height, width) = dst_shape;
    if height == 0 || width == 0 {
        return Err(Error::InvalidDimension { height, width });
    }
    if !angle.is_finite() {
        return Err(Error::InvalidConfig(format!("rotation angle {angle} is not finite")));
    }

    let src_center = src.center();
    let dst_center = Point::new((height as f64 - 1.0) / 2.0, (width as f64 - 1.0) / 2.0);
    remap(src, dst_shape, sampling, |p| {
        (p - dst_center).rotated_about(Point::default(), -angle) + src_center
    })
}

/// Maps a point of `src` into the frame produced by [`rotate`].
pub fn rotate_point(p: Point, src_shape: (usize, usize), angle: f64, dst_shape: (usize, usize)) -> Point {
    let center = |(h, w): (usize, usize)| Point::new((h as f64 - 1.0) / 2.0, (w as f64 - 1.0) / 2.0);
    (p - center(src_shape)).rotated_about(Point::default(), angle) + center(dst_shape)
}

/// Resizes `src` by `factor`; destination pixel `d` samples `src` at `d / factor`.
pub fn scale<T: Sample>(src: &Image<T>, factor: f64, sampling: Sampling) -> Result<Image<T>> {
    let dst_shape = scaled_shape(src.height(), src.width(), factor)?;
    remap(src, dst_shape, sampling, |p| p * (1.0 / factor))
}

/// Extracts a `size` window whose top-left pixel samples `src` at `origin`.
///
/// `origin` may be fractional or lie outside `src`; uncovered pixels get the
/// fill value.
pub fn crop<T: Sample>(
    src: &Image<T>,
    origin: Point,
    size: (usize, usize),
    sampling: Sampling,
) -> Result<Image<T>> {
    let (height, width) = size;
    if height == 0 || width == 0 {
        return Err(Error::InvalidDimension { height, width });
    }
    if !origin.is_finite() {
        return Err(Error::InvalidConfig(format!("crop origin {origin} is not finite")));
    }
    remap(src, size, sampling, |p| p + origin)
}
