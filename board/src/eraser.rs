//! Erase-gesture segmentation.
//!
//! One erase sample is a point and a radius. Strokes are split: the point
//! list is partitioned into maximal runs of consecutive points farther than
//! the radius from the erase point, and each surviving run of at least two
//! points becomes a new stroke with the same style. Non-stroke objects are
//! erased whole on a coarse circle-vs-box proximity test, not an exact shape
//! intersection.
//!
//! The caller records everything one sample deleted and created as a single
//! `Multi` history action, so one undo restores the pre-erase state exactly,
//! split fragments included. The operation runs once per pointer-move sample
//! while the eraser is active, not once per rendered frame.

#[cfg(test)]
#[path = "eraser_test.rs"]
mod eraser_test;

use crate::geom::{Bounds, Point};
use crate::object::{CanvasObject, Payload, StrokeData};
use crate::store::ObjectStore;

/// Minimum number of points a surviving stroke fragment must keep. Shorter
/// runs are dropped rather than becoming degenerate point-only objects.
const MIN_FRAGMENT_POINTS: usize = 2;

/// What one erase sample deletes and creates.
#[derive(Debug, Clone, Default)]
pub struct EraseOutcome {
    /// Objects removed: whole non-strokes plus every stroke that was split
    /// or fully erased.
    pub deleted: Vec<CanvasObject>,
    /// Stroke fragments synthesized from surviving runs.
    pub created: Vec<CanvasObject>,
}

impl EraseOutcome {
    /// Whether the sample touched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.created.is_empty()
    }
}

/// Compute the effect of erasing at `center` with `radius` against every
/// object in the store. Pure: the store is not mutated.
#[must_use]
pub fn erase_at(store: &ObjectStore, center: Point, radius: f64) -> EraseOutcome {
    let mut outcome = EraseOutcome::default();

    for obj in store.all() {
        match &obj.payload {
            Payload::Stroke(data) => {
                let runs = surviving_runs(&data.points, center, radius);
                if untouched(&runs, data.points.len()) {
                    continue;
                }
                outcome.deleted.push(obj.clone());
                for run in runs {
                    if run.len() >= MIN_FRAGMENT_POINTS {
                        outcome.created.push(fragment(data, run));
                    }
                }
            }
            _ => {
                if near_whole_object(obj, center, radius) {
                    outcome.deleted.push(obj.clone());
                }
            }
        }
    }

    outcome
}

/// Partition a point list into maximal runs of consecutive points whose
/// distance to `center` exceeds `radius`. Short runs are kept here; the
/// caller drops them at synthesis time, because their existence still marks
/// the stroke as modified.
fn surviving_runs(points: &[Point], center: Point, radius: f64) -> Vec<Vec<Point>> {
    let mut runs = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    for &pt in points {
        if pt.distance(center) > radius {
            current.push(pt);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// A stroke is untouched iff segmentation produced exactly one run equal to
/// the full original point list.
fn untouched(runs: &[Vec<Point>], original_len: usize) -> bool {
    runs.len() == 1 && runs[0].len() == original_len
}

/// Synthesize a fragment stroke from a surviving run: fresh id, bounds
/// re-hulled from the run, same style as the parent.
fn fragment(parent: &StrokeData, points: Vec<Point>) -> CanvasObject {
    let bounds = Bounds::from_points(points.iter().copied());
    CanvasObject::new(
        bounds,
        Payload::Stroke(StrokeData { points, color: parent.color.clone(), width: parent.width }),
    )
}

/// Coarse proximity test for whole-object erasure: distance from the erase
/// point to the bounds center against `radius + max(width, height) / 2`.
fn near_whole_object(obj: &CanvasObject, center: Point, radius: f64) -> bool {
    let half_extent = obj.bounds.width.max(obj.bounds.height) / 2.0;
    obj.bounds.center().distance(center) <= radius + half_extent
}
