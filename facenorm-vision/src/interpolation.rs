use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::image::{Image, Sample};

// Tolerance for coordinates that land a hair outside the grid after a
// rotation or scale round trip.
const BOUNDS_EPSILON: f64 = 1e-6;

/// How a sample is read at a non-integer source coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    Nearest,
    #[default]
    Bilinear,
}

/// Reads `image` at the continuous position `p`.
///
/// Positions outside the image return `fill` rather than failing.
pub fn interpolate<T: Sample>(image: &Image<T>, p: Point, mode: InterpolationMode, fill: f64) -> f64 {
    if !p.is_finite() {
        return fill;
    }
    match mode {
        InterpolationMode::Nearest => nearest(image, p, fill),
        InterpolationMode::Bilinear => bilinear(image, p, fill),
    }
}

fn nearest<T: Sample>(image: &Image<T>, p: Point, fill: f64) -> f64 {
    let (r, c) = (p.row.round(), p.col.round());
    if r < 0.0 || c < 0.0 {
        return fill;
    }
    image
        .get(r as usize, c as usize)
        .map_or(fill, Sample::to_f64)
}

fn bilinear<T: Sample>(image: &Image<T>, p: Point, fill: f64) -> f64 {
    let max_r = (image.height() - 1) as f64;
    let max_c = (image.width() - 1) as f64;
    if p.row < -BOUNDS_EPSILON
        || p.col < -BOUNDS_EPSILON
        || p.row > max_r + BOUNDS_EPSILON
        || p.col > max_c + BOUNDS_EPSILON
    {
        return fill;
    }

    let r = p.row.clamp(0.0, max_r);
    let c = p.col.clamp(0.0, max_c);
    let (r0, c0) = (r.floor() as usize, c.floor() as usize);
    let r1 = (r0 + 1).min(image.height() - 1);
    let c1 = (c0 + 1).min(image.width() - 1);
    let (fr, fc) = (r - r0 as f64, c - c0 as f64);

    let data = image.as_array();
    let p00 = data[[r0, c0]].to_f64();
    let p01 = data[[r0, c1]].to_f64();
    let p10 = data[[r1, c0]].to_f64();
    let p11 = data[[r1, c1]].to_f64();

    let top = p00 + (p01 - p00) * fc;
    let bottom = p10 + (p11 - p10) * fc;
    top + (bottom - top) * fr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use approx::assert_abs_diff_eq;

    fn ramp() -> Result<Image<f32>> {
        // value = 10 * row + col
        Image::from_fn(3, 4, |r, c| (10 * r + c) as f32)
    }

    #[test]
    fn test_bilinear_exact_on_grid() -> Result<()> {
        let img = ramp()?;
        let v = interpolate(&img, Point::new(2.0, 3.0), InterpolationMode::Bilinear, -1.0);
        assert_eq!(v, 23.0);
        Ok(())
    }

    #[test]
    fn test_bilinear_between_samples() -> Result<()> {
        let img = ramp()?;
        let v = interpolate(&img, Point::new(0.5, 1.25), InterpolationMode::Bilinear, -1.0);
        assert_abs_diff_eq!(v, 6.25, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_out_of_bounds_returns_fill() -> Result<()> {
        let img = ramp()?;
        for mode in [InterpolationMode::Nearest, InterpolationMode::Bilinear] {
            assert_eq!(interpolate(&img, Point::new(-1.0, 0.0), mode, 7.0), 7.0);
            assert_eq!(interpolate(&img, Point::new(0.0, 4.0), mode, 7.0), 7.0);
            assert_eq!(interpolate(&img, Point::new(f64::NAN, 0.0), mode, 7.0), 7.0);
        }
        Ok(())
    }

    #[test]
    fn test_nearest_rounds() -> Result<()> {
        let img = ramp()?;
        let v = interpolate(&img, Point::new(1.4, 2.6), InterpolationMode::Nearest, -1.0);
        assert_eq!(v, 13.0);
        Ok(())
    }

    #[test]
    fn test_bilinear_stays_in_range() -> Result<()> {
        let img = Image::from_fn(2, 2, |r, c| if (r + c) % 2 == 0 { 0u8 } else { 255 })?;
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let v = interpolate(&img, Point::new(t, 1.0 - t), InterpolationMode::Bilinear, 0.0);
            assert!((0.0..=255.0).contains(&v));
        }
        Ok(())
    }
}
