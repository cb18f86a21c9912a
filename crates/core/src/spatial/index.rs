//! R-tree over checkpoint positions.
//!
//! ## Two-Stage Filtering
//!
//! Radius queries first pull candidates out of a degree-space circle wide
//! enough to contain the search area at that latitude, then keep only those
//! whose Haversine distance is inside the radius. The R-tree stays in plain
//! lng/lat coordinates; only the final answer uses meters.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::checkpoint::{Checkpoint, Position};
use crate::spatial::queries::{haversine_distance, longitude_correction, meters_to_degrees};

#[derive(Clone, Debug)]
pub struct CheckpointNode {
    /// Index of the checkpoint in the slice the tree was built from.
    pub slot: usize,
    point: [f64; 2],
}

impl CheckpointNode {
    pub fn new(slot: usize, position: Position) -> Self {
        Self {
            slot,
            point: [position.lng, position.lat],
        }
    }
}

impl RTreeObject for CheckpointNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for CheckpointNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Snapshot index of a checkpoint set. Rebuild it after positions change.
pub struct CheckpointIndex {
    tree: RTree<CheckpointNode>,
    positions: Vec<Position>,
}

impl CheckpointIndex {
    pub fn build(checkpoints: &[Checkpoint]) -> Self {
        let positions: Vec<Position> = checkpoints.iter().map(|c| c.position).collect();
        let tree = RTree::bulk_load(
            positions
                .iter()
                .enumerate()
                .map(|(slot, position)| CheckpointNode::new(slot, *position))
                .collect(),
        );

        Self { tree, positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Slots of checkpoints strictly closer than `radius_m`, nearest first.
    pub fn within(&self, center: Position, radius_m: f64) -> Vec<usize> {
        if radius_m <= 0.0 || !radius_m.is_finite() {
            return Vec::new();
        }

        // Longitude degrees shrink away from the equator, so the coarse
        // circle is sized by the wider of the two axes.
        let dlat = meters_to_degrees(radius_m);
        let dlng = (dlat * longitude_correction(center.lat).abs()).min(360.0);
        let coarse = dlat.max(dlng);

        // A circle spilling over the antimeridian is searched again around
        // the mirrored center.
        let mut centers = vec![center.lng];
        if center.lng + coarse > 180.0 {
            centers.push(center.lng - 360.0);
        }
        if center.lng - coarse < -180.0 {
            centers.push(center.lng + 360.0);
        }

        let origin = center.to_point();
        let mut hits: Vec<(usize, f64)> = centers
            .into_iter()
            .flat_map(|lng| self.tree.locate_within_distance([lng, center.lat], coarse * coarse))
            .map(|node| (node.slot, haversine_distance(origin, self.positions[node.slot].to_point())))
            .filter(|(_, distance)| *distance < radius_m)
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.into_iter().map(|(slot, _)| slot).collect()
    }

    /// The `n` closest slots by planar degree distance; good enough for
    /// ranking over hunt-sized areas.
    pub fn nearest(&self, center: Position, n: usize) -> Vec<usize> {
        self.tree
            .nearest_neighbor_iter(&[center.lng, center.lat])
            .take(n)
            .map(|node| node.slot)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{Question, QuestionId, Task};

    fn checkpoint_at(lat: f64, lng: f64) -> Checkpoint {
        let question = Question {
            id: QuestionId(1),
            question: "q".into(),
            options: vec![],
            task: Task::Trivia { answer: 0 },
            points: 1,
        };
        Checkpoint::from_question(&question, Position::new(lat, lng))
    }

    #[test]
    fn test_empty_index() {
        let index = CheckpointIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.within(Position::new(0.0, 0.0), 100.0).is_empty());
    }

    #[test]
    fn test_within_uses_meters() {
        let center = Position::new(60.0, 10.0);
        // ~55 m east (longitude degrees are half as long at 60°), ~222 m north,
        // ~83 m west.
        let checkpoints = vec![
            checkpoint_at(60.0, 10.001),
            checkpoint_at(60.002, 10.0),
            checkpoint_at(60.0, 9.9985),
        ];
        let index = CheckpointIndex::build(&checkpoints);

        assert_eq!(index.within(center, 100.0), vec![0, 2]);
        assert_eq!(index.within(center, 250.0), vec![0, 2, 1]);
        assert!(index.within(center, 0.0).is_empty());
    }

    #[test]
    fn test_within_across_antimeridian() {
        // ~50 m either side of the seam.
        let checkpoints = vec![
            checkpoint_at(0.0, 179.9996),
            checkpoint_at(0.0, -179.9996),
            checkpoint_at(0.0, 179.99),
        ];
        let index = CheckpointIndex::build(&checkpoints);

        let mut east = index.within(Position::new(0.0, 179.9999), 100.0);
        east.sort();
        assert_eq!(east, vec![0, 1]);

        let mut west = index.within(Position::new(0.0, -179.9999), 100.0);
        west.sort();
        assert_eq!(west, vec![0, 1]);
    }

    #[test]
    fn test_nearest() {
        let checkpoints = vec![
            checkpoint_at(0.003, 0.0),
            checkpoint_at(0.001, 0.0),
            checkpoint_at(0.002, 0.0),
        ];
        let index = CheckpointIndex::build(&checkpoints);
        assert_eq!(index.nearest(Position::new(0.0, 0.0), 2), vec![1, 2]);
    }
}
