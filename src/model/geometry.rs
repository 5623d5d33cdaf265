// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scene geometry.
//!
//! Scene coordinates grow to the right (`x`) and downwards (`y`). Angles are in degrees,
//! measured counter-clockwise from the positive x axis, so `90` points to the top of an item.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Result<Self, PointError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(PointError::NotFinite { x, y });
        }
        Ok(Self { x, y })
    }

    /// Like [`Point::new`], but maps non-finite input to the origin.
    pub fn finite_or_origin(x: f64, y: f64) -> Self {
        Self::new(x, y).unwrap_or(Self::ORIGIN)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::finite_or_origin(self.x + dx, self.y + dy)
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: Point) -> Self {
        Self { x: (self.x + other.x) / 2.0, y: (self.y + other.y) / 2.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PointError {
    #[error("point coordinates must be finite (x={x}, y={y})")]
    NotFinite { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width: width.max(0.0), height: height.max(0.0) }
    }

    pub fn square(edge: f64) -> Self {
        Self::new(edge, edge)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    origin: Point,
    size: Size,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn left(&self) -> f64 {
        self.origin.x
    }

    pub fn top(&self) -> f64 {
        self.origin.y
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::finite_or_origin(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Point on the rectangle outline in the direction of `angle`.
    ///
    /// The projection is done in square-normalised space, so the eight compass angles land
    /// exactly on edge midpoints (0, 90, 180, -90) and corners (±45, ±135).
    pub fn anchor_at(&self, angle: f64) -> Point {
        let radians = angle.to_radians();
        let dx = radians.cos();
        let dy = -radians.sin();
        let scale = dx.abs().max(dy.abs());
        let (dx, dy) = if scale <= f64::EPSILON { (0.0, 0.0) } else { (dx / scale, dy / scale) };
        let center = self.center();
        Point::finite_or_origin(
            center.x + dx * self.size.width / 2.0,
            center.y + dy * self.size.height / 2.0,
        )
    }
}

/// Point on a circle around `center` in the direction of `angle`.
pub fn point_on_circle(center: Point, radius: f64, angle: f64) -> Point {
    let radians = (-angle).to_radians();
    Point::finite_or_origin(center.x + radius * radians.cos(), center.y + radius * radians.sin())
}

/// Normalises an angle into `(-180, 180]`.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut normalized = angle % 360.0;
    if normalized > 180.0 {
        normalized -= 360.0;
    } else if normalized <= -180.0 {
        normalized += 360.0;
    }
    normalized
}

/// Angle (degrees) of `point` as seen from `center`.
pub fn angle_towards(center: Point, point: Point) -> f64 {
    normalize_angle((-(point.y - center.y)).atan2(point.x - center.x).to_degrees())
}

/// Shortest distance between `point` and the segment `a`-`b`.
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let len_sq = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    if len_sq <= f64::EPSILON {
        return point.distance_to(a);
    }
    let t = (((point.x - a.x) * (b.x - a.x) + (point.y - a.y) * (b.y - a.y)) / len_sq).clamp(0.0, 1.0);
    let projected = Point { x: a.x + t * (b.x - a.x), y: a.y + t * (b.y - a.y) };
    point.distance_to(projected)
}
