//! Eye-coordinate files.
//!
//! The first non-empty, non-comment line holds four numbers
//! `LEFT_ROW LEFT_COL RIGHT_ROW RIGHT_COL`, separated by whitespace or
//! commas. Values may be integers or floats.

use std::path::Path;

use anyhow::{bail, Context, Result};
use facenorm_vision::{LandmarkPair, Point};

pub fn parse_landmarks(text: &str) -> Result<LandmarkPair> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .context("no landmark line found")?;

    let values = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("invalid coordinate `{s}`"))
        })
        .collect::<Result<Vec<_>>>()?;

    let [lr, lc, rr, rc] = values[..] else {
        bail!("expected 4 coordinates, found {}", values.len());
    };
    Ok(LandmarkPair::new(Point::new(lr, lc), Point::new(rr, rc)))
}

pub fn load_landmarks(path: &Path) -> Result<LandmarkPair> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading landmarks {}", path.display()))?;
    parse_landmarks(&raw).with_context(|| format!("parsing landmarks {}", path.display()))
}
