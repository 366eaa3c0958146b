//! Point arithmetic in image coordinates.
//!
//! All coordinates use a single `(row, col)` convention: `row` runs along the
//! image height and grows downward, `col` runs along the width. Pairs such as
//! `(120, 147)` are always `(row, col)`, never `(x, y)`.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A continuous position in `(row, col)` image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub row: f64,
    pub col: f64,
}

impl Point {
    pub const fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    pub fn is_finite(&self) -> bool {
        self.row.is_finite() && self.col.is_finite()
    }

    /// Rotates `self` about `center` by `angle` radians.
    ///
    /// A positive angle adds to `atan2(d_row, d_col)` of the offset from
    /// `center`, which is the same direction [`crate::resample::rotate`] uses.
    pub fn rotated_about(self, center: Point, angle: f64) -> Point {
        let (sin, cos) = angle.sin_cos();
        let d = self - center;
        Point {
            row: center.row + d.col * sin + d.row * cos,
            col: center.col + d.col * cos - d.row * sin,
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.row + rhs.row, self.col + rhs.col)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.row - rhs.row, self.col - rhs.col)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.row * rhs, self.col * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.row, -self.col)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected `row,col`, got `{0}`")]
pub struct ParsePointError(String);

impl FromStr for Point {
    type Err = ParsePointError;

    /// Parses `"row,col"`; surrounding whitespace and parentheses are ignored.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let err = || ParsePointError(s.to_string());
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (row, col) = trimmed.split_once(',').ok_or_else(err)?;
        let row: f64 = row.trim().parse().map_err(|_| err())?;
        let col: f64 = col.trim().parse().map_err(|_| err())?;
        Ok(Point::new(row, col))
    }
}

/// The two reference landmarks of a face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPair {
    pub left_eye: Point,
    pub right_eye: Point,
}

impl LandmarkPair {
    pub const fn new(left_eye: Point, right_eye: Point) -> Self {
        Self {
            left_eye,
            right_eye,
        }
    }

    pub fn midpoint(&self) -> Point {
        midpoint(self.left_eye, self.right_eye)
    }

    pub fn distance(&self) -> f64 {
        distance(self.left_eye, self.right_eye)
    }

    /// Applies `f` to both landmarks.
    pub fn map(self, f: impl Fn(Point) -> Point) -> Self {
        Self::new(f(self.left_eye), f(self.right_eye))
    }

    /// Fails with [`Error::DegenerateGeometry`] when the landmarks coincide or
    /// are not finite.
    pub fn validate(&self) -> Result<()> {
        if !self.left_eye.is_finite() || !self.right_eye.is_finite() || self.distance() == 0.0 {
            return Err(Error::DegenerateGeometry {
                a: self.left_eye,
                b: self.right_eye,
            });
        }
        Ok(())
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    let d = b - a;
    d.row.hypot(d.col)
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.row + b.row) / 2.0, (a.col + b.col) / 2.0)
}

/// Signed angle of the segment `a -> b` against the horizontal axis,
/// `atan2(b.row - a.row, b.col - a.col)`.
///
/// Rotating the image by the negated angle levels the segment, see
/// [`level_out_angle`].
pub fn angle_to_horizontal(a: Point, b: Point) -> Result<f64> {
    LandmarkPair::new(a, b).validate()?;
    Ok((b.row - a.row).atan2(b.col - a.col))
}

/// Rotation that makes `a -> b` horizontal and pointing to increasing `col`.
pub fn level_out_angle(a: Point, b: Point) -> Result<f64> {
    angle_to_horizontal(a, b).map(|angle| -angle)
}
