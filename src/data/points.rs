// Point buffer used for calibration and measurement.
// Holds at most two clicked points; what happens on a third click is decided
// by `ExtraPointPolicy`.

use serde::{Deserialize, Serialize};

use super::geometry::{pixel_distance, Point};

/// What a click does when two points are already selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtraPointPolicy {
    /// Drop both points and start a new pair with the click.
    #[default]
    StartOver,
    /// Drop the oldest point and keep the click as the second one.
    Slide,
    /// Ignore the click until the buffer is cleared.
    Reject,
}

/// Result of pushing a point into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The point was stored; the buffer now holds `len` points.
    Added { len: usize },
    /// The buffer was full and the click was ignored.
    Rejected,
}

#[derive(Debug, Clone, Default)]
pub struct PointBuffer {
    points: Vec<Point>,
    policy: ExtraPointPolicy,
}

impl PointBuffer {
    pub const CAPACITY: usize = 2;

    pub fn new(policy: ExtraPointPolicy) -> Self {
        Self {
            points: Vec::with_capacity(Self::CAPACITY),
            policy,
        }
    }

    pub fn policy(&self) -> ExtraPointPolicy {
        self.policy
    }

    /// Handle a click at `point` (image pixel coordinates).
    pub fn push(&mut self, point: Point) -> PushOutcome {
        if self.points.len() == Self::CAPACITY {
            match self.policy {
                ExtraPointPolicy::StartOver => self.points.clear(),
                ExtraPointPolicy::Slide => {
                    self.points.remove(0);
                }
                ExtraPointPolicy::Reject => return PushOutcome::Rejected,
            }
        }
        self.points.push(point);
        PushOutcome::Added {
            len: self.points.len(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Both points, if exactly two are selected.
    pub fn pair(&self) -> Option<(Point, Point)> {
        pair_from(&self.points)
    }

    /// Pixel distance between the two selected points, if there are two.
    pub fn pixel_distance(&self) -> Option<f64> {
        self.pair().map(|(a, b)| pixel_distance(a, b))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// The two points of `points` when it holds exactly two of them.
pub fn pair_from(points: &[Point]) -> Option<(Point, Point)> {
    match points {
        [a, b] => Some((*a, *b)),
        _ => None,
    }
}
