// Copyright (c) 2024 Mike Tsao

//! Distances and thresholds on the shared 2D plane.

use core::fmt::Display;
use serde::{Deserialize, Serialize};

/// A position on the canvas. The plane is unbounded and uses the rendering
/// surface's coordinates (x grows right, y grows down).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Point {
    #[allow(missing_docs)]
    pub x: f64,
    #[allow(missing_docs)]
    pub y: f64,
}
impl Point {
    #[allow(missing_docs)]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The vector from `self` to `other`, as a [Point] relative to `self`.
    /// Renderers draw connection lines from a node's own origin, so they want
    /// the offset rather than the absolute destination.
    pub fn offset_to(&self, other: &Point) -> Point {
        Point::new(other.x - self.x, other.y - self.y)
    }
}
impl From<(f64, f64)> for Point {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}
impl Display for Point {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Squared Euclidean distance. Everything that only compares distances uses
/// this to avoid the square root.
pub fn distance_squared(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Euclidean distance between two positions.
pub fn distance(a: &Point, b: &Point) -> f64 {
    distance_squared(a, b).sqrt()
}

/// True iff `a` and `b` are strictly closer than `r`. Runs on every drag
/// frame, so it never takes a square root.
pub fn within_range(a: &Point, b: &Point, r: f64) -> bool {
    distance_squared(a, b) < r * r
}
