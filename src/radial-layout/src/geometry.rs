// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::graph::Position;

/// Tolerance for parallelism, collinearity and zero-length checks.
const EPSILON: f64 = 1e-9;

/// A straight line segment between two layout positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Position,
    pub end: Position,
}

/// How two segments meet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intersection {
    None,
    /// The segments meet in exactly one point.
    Point(Position),
    /// The segments are collinear and share a stretch of positive length.
    Overlap(Segment),
}

impl Segment {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).length()
    }

    pub fn at(&self, t: f64) -> Position {
        self.start + (self.end - self.start) * t
    }

    /// Classify how `self` and `other` meet. Zero-length segments never
    /// intersect anything.
    pub fn intersection(&self, other: &Segment) -> Intersection {
        let d1 = self.end - self.start;
        let d2 = other.end - other.start;
        let len1 = d1.length();
        let len2 = d2.length();
        if len1 < EPSILON || len2 < EPSILON {
            return Intersection::None;
        }

        let w = other.start - self.start;
        let denom = d1.cross_2d(d2);

        if denom.abs() < EPSILON * len1 * len2 {
            // parallel: only collinear segments can meet
            if w.cross_2d(d1).abs() > EPSILON * len1 {
                return Intersection::None;
            }
            return self.collinear_overlap(other);
        }

        // Parametric intersection: t for self, u for other
        let t = w.cross_2d(d2) / denom;
        let u = w.cross_2d(d1) / denom;
        let slack_t = EPSILON / len1;
        let slack_u = EPSILON / len2;
        if (-slack_t..=1.0 + slack_t).contains(&t) && (-slack_u..=1.0 + slack_u).contains(&u) {
            Intersection::Point(self.at(t.clamp(0.0, 1.0)))
        } else {
            Intersection::None
        }
    }

    fn collinear_overlap(&self, other: &Segment) -> Intersection {
        let d1 = self.end - self.start;
        let len_sq = d1.dot(d1);
        let t0 = (other.start - self.start).dot(d1) / len_sq;
        let t1 = (other.end - self.start).dot(d1) / len_sq;
        let lo = t0.min(t1).max(0.0);
        let hi = t0.max(t1).min(1.0);

        let overlap = (hi - lo) * len_sq.sqrt();
        if overlap > EPSILON {
            Intersection::Overlap(Segment::new(self.at(lo), self.at(hi)))
        } else if overlap > -EPSILON {
            Intersection::Point(self.at(lo.min(1.0)))
        } else {
            Intersection::None
        }
    }

    /// Shortest distance from `p` to any point of the segment.
    pub fn distance_to(&self, p: Position) -> f64 {
        let d = self.end - self.start;
        let len_sq = d.dot(d);
        if len_sq < EPSILON * EPSILON {
            return (p - self.start).length();
        }
        let t = ((p - self.start).dot(d) / len_sq).clamp(0.0, 1.0);
        (p - self.at(t)).length()
    }
}

/// A disc drawn around a vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Position,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Position, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Whether the segment touches the disc, including segments that lie
    /// entirely inside it.
    pub fn intersects_segment(&self, segment: &Segment) -> bool {
        segment.distance_to(self.center) <= self.radius
    }
}
