//! Pixel-to-real-world scale and the two actions that use it.

use std::fmt;

use crate::error::SessionError;

use super::geometry::{pixel_distance, Point};
use super::points::pair_from;

/// Real-world units per pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f64);

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(1.0)
    }
}

impl ScaleFactor {
    pub fn value(self) -> f64 {
        self.0
    }

    /// Scale derived from a known length spanning `pixels` pixels.
    pub fn from_reference(known_length: f64, pixels: f64) -> Self {
        Self(known_length / pixels)
    }

    pub fn apply(self, pixels: f64) -> f64 {
        pixels * self.0
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Parse the "known real-world length" text field.
///
/// Accepts any finite number greater than zero, ignoring surrounding
/// whitespace.
pub fn parse_known_length(input: &str) -> Result<f64, SessionError> {
    let invalid = || SessionError::InvalidLength {
        input: input.to_string(),
    };
    let value: f64 = input.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

/// Compute a new scale from the selected points and the entered length.
///
/// Point count is checked before the length so the user is first told to
/// pick points.
pub fn calibrate(points: &[Point], known_length: &str) -> Result<ScaleFactor, SessionError> {
    let (p1, p2) = pair_from(points).ok_or(SessionError::CalibrationPointCount {
        found: points.len(),
    })?;
    let known = parse_known_length(known_length)?;
    let pixels = pixel_distance(p1, p2);
    if pixels <= 0.0 {
        return Err(SessionError::DegeneratePair);
    }
    Ok(ScaleFactor::from_reference(known, pixels))
}

/// A completed measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub p1: Point,
    pub p2: Point,
    pub pixels: f64,
    pub distance: f64,
    pub unit: String,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.distance, self.unit)
    }
}

/// Measure the distance between the selected points using `scale`.
pub fn measure(points: &[Point], scale: ScaleFactor, unit: &str) -> Result<Measurement, SessionError> {
    let (p1, p2) = pair_from(points).ok_or(SessionError::MeasurementPointCount {
        found: points.len(),
    })?;
    let pixels = pixel_distance(p1, p2);
    Ok(Measurement {
        p1,
        p2,
        pixels,
        distance: scale.apply(pixels),
        unit: unit.to_string(),
    })
}
