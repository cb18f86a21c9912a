//! Where a checkpoint sits relative to the player: distance, bearing, and
//! the on-screen placement used by the AR view.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::checkpoint::{Checkpoint, Position, QuestionId};
use crate::spatial::queries::{bearing, haversine_distance, normalize_bearing};

/// A checkpoint can be collected strictly inside this distance.
pub const COLLECTION_RADIUS_M: f64 = 20.0;

/// Checkpoints strictly inside this distance show up in the nearby list.
pub const NEARBY_RADIUS_M: f64 = 100.0;

pub const FIELD_OF_VIEW_DEG: f64 = 60.0;

/// Camera model for projecting checkpoints onto the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub fov_deg: f64,
    /// Screen x is reported in `[-half_width, half_width]`, 0 being dead ahead.
    pub half_width: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Distance at which a marker is drawn at scale 1.
    pub reference_distance_m: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            fov_deg: FIELD_OF_VIEW_DEG,
            half_width: 1.0,
            min_scale: 0.3,
            max_scale: 1.5,
            reference_distance_m: COLLECTION_RADIUS_M,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Proximity {
    pub distance_m: f64,
    pub bearing: f64,
    pub relative_bearing: f64,
    pub screen_x: f64,
    pub scale: f64,
    pub visible: bool,
    pub collectible: bool,
    pub nearby: bool,
}

impl Viewport {
    /// Evaluate `target` as seen from `player`. Without a compass heading
    /// the view is assumed to face north.
    pub fn evaluate(&self, player: Position, target: Position, heading: Option<f64>) -> Proximity {
        let from = player.to_point();
        let to = target.to_point();

        let distance_m = haversine_distance(from, to);
        let bearing = bearing(from, to);
        let relative_bearing = normalize_bearing(bearing - heading.unwrap_or(0.0));

        let half_fov = self.fov_deg / 2.0;
        let screen_x = (relative_bearing / half_fov * self.half_width)
            .clamp(-self.half_width, self.half_width);

        let scale = if distance_m > 0.0 {
            (self.reference_distance_m / distance_m).clamp(self.min_scale, self.max_scale)
        } else {
            self.max_scale
        };

        Proximity {
            distance_m,
            bearing,
            relative_bearing,
            screen_x,
            scale,
            visible: relative_bearing.abs() < half_fov,
            collectible: is_collectible(distance_m),
            nearby: is_nearby(distance_m),
        }
    }
}

pub fn is_collectible(distance_m: f64) -> bool {
    distance_m < COLLECTION_RADIUS_M
}

pub fn is_nearby(distance_m: f64) -> bool {
    distance_m < NEARBY_RADIUS_M
}

/// Recompute every checkpoint's distance from `player`.
pub fn refresh_distances(player: Position, checkpoints: &mut [Checkpoint]) {
    let from = player.to_point();
    for checkpoint in checkpoints {
        checkpoint.distance = Some(haversine_distance(from, checkpoint.position.to_point()));
    }
}

/// Keep the first checkpoint seen for each question id.
pub fn dedup_by_id(checkpoints: impl IntoIterator<Item = Checkpoint>) -> Vec<Checkpoint> {
    let mut seen: HashSet<QuestionId> = HashSet::new();
    checkpoints
        .into_iter()
        .filter(|checkpoint| seen.insert(checkpoint.id))
        .collect()
}

/// Uncollected first, then nearest first. Checkpoints with no known
/// distance sort last within their group.
pub fn sort_for_display(checkpoints: &mut [Checkpoint]) {
    checkpoints.sort_by(|a, b| {
        a.collected.cmp(&b.collected).then_with(|| {
            let a = a.distance.unwrap_or(f64::INFINITY);
            let b = b.distance.unwrap_or(f64::INFINITY);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        })
    });
}
