//! Output-shape bookkeeping for the resampling operations.

use crate::error::{Error, Result};

// Absorbs float noise such as `cos(PI / 2) = 6.1e-17` before rounding up.
const SHAPE_EPSILON: f64 = 1e-9;

/// Largest pixel count a computed output shape may have (2^28, 256 Mi samples).
pub const MAX_PIXELS: usize = 1 << 28;

fn within_limit(height: f64, width: f64) -> Option<(usize, usize)> {
    if !(height <= MAX_PIXELS as f64 && width <= MAX_PIXELS as f64) {
        return None;
    }
    let (height, width) = (height as usize, width as usize);
    height
        .checked_mul(width)
        .filter(|&n| n <= MAX_PIXELS)
        .map(|_| (height, width))
}

/// Smallest `(height, width)` that holds a `height x width` rectangle rotated
/// by `angle` radians about its centre.
///
/// Uses the rotated bounding box `w|cos| + h|sin|` by `w|sin| + h|cos|`,
/// rounded up, so no source pixel falls outside the destination. Fails with
/// [`Error::InvalidDimension`] when the result exceeds [`MAX_PIXELS`].
pub fn rotated_shape(height: usize, width: usize, angle: f64) -> Result<(usize, usize)> {
    if height == 0 || width == 0 {
        return Err(Error::InvalidDimension { height, width });
    }
    if !angle.is_finite() {
        return Err(Error::InvalidConfig(format!("rotation angle {angle} is not finite")));
    }

    let (h, w) = (height as f64, width as f64);
    let (sin, cos) = angle.sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());

    let new_width = (w * cos + h * sin - SHAPE_EPSILON).ceil().max(0.0);
    let new_height = (w * sin + h * cos - SHAPE_EPSILON).ceil().max(0.0);
    let Some((new_height, new_width)) = within_limit(new_height, new_width) else {
        return Err(Error::InvalidDimension { height, width });
    };

    if new_height == 0 || new_width == 0 {
        return Err(Error::InvalidDimension {
            height: new_height,
            width: new_width,
        });
    }
    Ok((new_height, new_width))
}

/// Shape of a `height x width` image scaled by `factor`, each side rounded to
/// the nearest integer.
///
/// A factor whose result exceeds [`MAX_PIXELS`] is reported as
/// [`Error::InvalidScale`].
pub fn scaled_shape(height: usize, width: usize, factor: f64) -> Result<(usize, usize)> {
    if !(factor.is_finite() && factor > 0.0) {
        return Err(Error::InvalidScale(factor));
    }
    if height == 0 || width == 0 {
        return Err(Error::InvalidDimension { height, width });
    }

    let new_height = (height as f64 * factor).round();
    let new_width = (width as f64 * factor).round();
    if new_height < 1.0 || new_width < 1.0 || !new_height.is_finite() || !new_width.is_finite() {
        return Err(Error::InvalidDimension {
            height: new_height.max(0.0) as usize,
            width: new_width.max(0.0) as usize,
        });
    }
    within_limit(new_height, new_width).ok_or(Error::InvalidScale(factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn test_rotated_shape_identity() -> Result<()> {
        assert_eq!(rotated_shape(300, 200, 0.0)?, (300, 200));
        assert_eq!(rotated_shape(300, 200, PI)?, (300, 200));
        Ok(())
    }

    #[test]
    fn test_rotated_shape_quarter_turn_swaps() -> Result<()> {
        assert_eq!(rotated_shape(300, 200, FRAC_PI_2)?, (200, 300));
        assert_eq!(rotated_shape(300, 200, -FRAC_PI_2)?, (200, 300));
        Ok(())
    }

    #[test]
    fn test_rotated_shape_diagonal() -> Result<()> {
        // 100 * sqrt(2) = 141.42
        assert_eq!(rotated_shape(100, 100, FRAC_PI_4)?, (142, 142));
        Ok(())
    }

    #[test]
    fn test_rotated_shape_never_smaller_than_bounds() -> Result<()> {
        for step in -40..=40 {
            let angle = step as f64 * PI / 40.0;
            let (h, w) = rotated_shape(37, 91, angle)?;
            let exact_w = 91.0 * angle.cos().abs() + 37.0 * angle.sin().abs();
            let exact_h = 91.0 * angle.sin().abs() + 37.0 * angle.cos().abs();
            assert!(w as f64 >= exact_w - 1e-6 && (w as f64) < exact_w + 1.0);
            assert!(h as f64 >= exact_h - 1e-6 && (h as f64) < exact_h + 1.0);
        }
        Ok(())
    }

    #[test]
    fn test_rotated_shape_rejects_empty() {
        assert_eq!(
            rotated_shape(0, 10, 0.3),
            Err(Error::InvalidDimension {
                height: 0,
                width: 10
            })
        );
        assert!(rotated_shape(10, 10, f64::NAN).is_err());
    }

    #[test]
    fn test_scaled_shape() -> Result<()> {
        assert_eq!(scaled_shape(300, 200, 0.5)?, (150, 100));
        assert_eq!(scaled_shape(3, 3, 1.5)?, (5, 5));
        assert_eq!(scaled_shape(10, 10, 0.0), Err(Error::InvalidScale(0.0)));
        assert!(scaled_shape(10, 10, -1.0).is_err());
        assert!(scaled_shape(10, 10, f64::INFINITY).is_err());
        assert_eq!(
            scaled_shape(10, 10, 0.01),
            Err(Error::InvalidDimension {
                height: 0,
                width: 0
            })
        );
        Ok(())
    }

    #[test]
    fn test_scaled_shape_rejects_oversized_result() {
        assert_eq!(scaled_shape(100, 100, 1e12), Err(Error::InvalidScale(1e12)));
        assert_eq!(scaled_shape(100, 100, 1e7), Err(Error::InvalidScale(1e7)));
        // 16384 x 16384 sits exactly on the limit.
        assert_eq!(scaled_shape(100, 100, 163.84), Ok((16384, 16384)));
        assert!(scaled_shape(100, 100, 163.85).is_err());
    }

    #[test]
    fn test_rotated_shape_rejects_oversized_result() {
        let side = 1 << 15;
        assert_eq!(
            rotated_shape(side, side, 0.3),
            Err(Error::InvalidDimension {
                height: side,
                width: side
            })
        );
        assert!(rotated_shape(usize::MAX, 2, 0.0).is_err());
    }
}
