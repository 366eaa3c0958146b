use ndarray::Array2;

use crate::error::{Error, Result};
use crate::geometry::Point;

/// A scalar pixel type.
///
/// Resampling works in `f64`; `from_f64` converts back, rounding and
/// clamping integer types to their valid range.
pub trait Sample: Copy + Default + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_integer_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(value: f64) -> Self {
                    // `as` saturates and maps NaN to zero
                    value.round().clamp(<$t>::MIN as f64, <$t>::MAX as f64) as $t
                }
            }
        )*
    };
}

impl_integer_sample!(u8, u16);

impl Sample for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

/// A single-channel image, stored row-major.
///
/// Height and width are always positive. Every resampling operation returns a
/// new `Image`; none of them write into their input.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T: Sample> {
    data: Array2<T>,
}

impl<T: Sample> Image<T> {
    /// Wraps a row-major buffer of `height * width` samples.
    pub fn from_vec(height: usize, width: usize, pixels: Vec<T>) -> Result<Self> {
        check_dimensions(height, width)?;
        let expected = height * width;
        if pixels.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        let data = Array2::from_shape_vec((height, width), pixels)
            .map_err(|_| Error::InvalidDimension { height, width })?;
        Ok(Self { data })
    }

    pub fn from_array(data: Array2<T>) -> Result<Self> {
        let (height, width) = data.dim();
        check_dimensions(height, width)?;
        Ok(Self { data })
    }

    pub fn filled(height: usize, width: usize, value: T) -> Result<Self> {
        check_dimensions(height, width)?;
        Ok(Self {
            data: Array2::from_elem((height, width), value),
        })
    }

    /// Builds an image by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(
        height: usize,
        width: usize,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> Result<Self> {
        check_dimensions(height, width)?;
        Ok(Self {
            data: Array2::from_shape_fn((height, width), |(r, c)| f(r, c)),
        })
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// `(height, width)`
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Continuous centre `((h - 1) / 2, (w - 1) / 2)`, pixel centres lying on
    /// integer coordinates.
    pub fn center(&self) -> Point {
        Point::new(
            (self.height() as f64 - 1.0) / 2.0,
            (self.width() as f64 - 1.0) / 2.0,
        )
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.data.get((row, col)).copied()
    }

    pub fn as_array(&self) -> &Array2<T> {
        &self.data
    }

    /// Row-major copy of the samples.
    pub fn to_vec(&self) -> Vec<T> {
        self.data.iter().copied().collect()
    }

    pub fn into_array(self) -> Array2<T> {
        self.data
    }
}

fn check_dimensions(height: usize, width: usize) -> Result<()> {
    if height == 0 || width == 0 {
        return Err(Error::InvalidDimension { height, width });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Image::from_vec(2, 3, vec![0u8; 6]).is_ok());
        assert_eq!(
            Image::from_vec(2, 3, vec![0u8; 5]),
            Err(Error::BufferSize {
                expected: 6,
                actual: 5
            })
        );
        assert_eq!(
            Image::<u8>::from_vec(0, 3, vec![]),
            Err(Error::InvalidDimension {
                height: 0,
                width: 3
            })
        );
    }

    #[test]
    fn test_row_major_layout() -> Result<()> {
        let img = Image::from_vec(2, 3, vec![1u8, 2, 3, 4, 5, 6])?;
        assert_eq!(img.shape(), (2, 3));
        assert_eq!(img.get(0, 2), Some(3));
        assert_eq!(img.get(1, 0), Some(4));
        assert_eq!(img.get(2, 0), None);
        assert_eq!(img.center(), Point::new(0.5, 1.0));
        assert_eq!(img.to_vec(), vec![1, 2, 3, 4, 5, 6]);
        Ok(())
    }

    #[test]
    fn test_sample_conversion_clamps() {
        assert_eq!(u8::from_f64(255.6), 255);
        assert_eq!(u8::from_f64(-3.0), 0);
        assert_eq!(u8::from_f64(127.5), 128);
        assert_eq!(u16::from_f64(70000.0), u16::MAX);
        assert_eq!(f32::from_f64(0.25), 0.25f32);
    }
}
