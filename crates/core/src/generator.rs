//! Checkpoint placement.
//!
//! Points are scattered uniformly over the disc around the hunt origin and
//! kept apart from the origin and from each other. Placement never fails:
//! once a point's retry budget is spent the last candidate is accepted
//! as-is, so a hunt can always start even when the configured radius is too
//! small for the requested count.

use std::f64::consts::TAU;

use rand::Rng;
use tracing::{debug, warn};

use crate::checkpoint::{Checkpoint, Position, Question};
use crate::spatial::queries::{haversine_distance, longitude_correction, meters_to_degrees, wrap_longitude};

/// Minimum distance between a checkpoint and the hunt origin, and between
/// two generated checkpoints.
pub const MIN_CLEARANCE_M: f64 = 7.0;

pub const MAX_ATTEMPTS_PER_POINT: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementParams {
    pub radius_m: f64,
    pub min_from_center_m: f64,
    pub min_between_m: f64,
    pub max_attempts: usize,
}

impl PlacementParams {
    pub fn with_radius(radius_m: f64) -> Self {
        Self {
            radius_m,
            min_from_center_m: MIN_CLEARANCE_M,
            min_between_m: MIN_CLEARANCE_M,
            max_attempts: MAX_ATTEMPTS_PER_POINT,
        }
    }
}

/// Draw one candidate position, uniform over the ring
/// `[min_from_center_m, radius_m]` around `center`.
///
/// The radius is `sqrt`-transformed: area grows with `r²`, so drawing `r`
/// directly would crowd points toward the middle.
pub fn sample_candidate<R: Rng + ?Sized>(
    rng: &mut R,
    center: Position,
    params: &PlacementParams,
) -> Position {
    let span = params.radius_m - params.min_from_center_m;
    let r = meters_to_degrees(params.min_from_center_m + rng.random::<f64>().sqrt() * span);
    let t = rng.random_range(0.0..TAU);

    let x = r * t.cos();
    let y = r * t.sin() * longitude_correction(center.lat);

    Position::new(center.lat + x, wrap_longitude(center.lng + y))
}

fn is_clear(candidate: Position, center: Position, params: &PlacementParams, placed: &[Position]) -> bool {
    let point = candidate.to_point();

    let from_center = haversine_distance(center.to_point(), point);
    if from_center < params.min_from_center_m || from_center > params.radius_m {
        return false;
    }

    placed
        .iter()
        .all(|other| haversine_distance(other.to_point(), point) > params.min_between_m)
}

/// Place a single point against everything in `placed`.
///
/// Returns the position and whether it actually satisfied the clearance
/// rules.
fn place_point<R: Rng + ?Sized>(
    rng: &mut R,
    center: Position,
    params: &PlacementParams,
    placed: &[Position],
) -> (Position, bool) {
    let attempts = params.max_attempts.max(1);

    let mut candidate = sample_candidate(rng, center, params);
    for attempt in 1..attempts {
        if is_clear(candidate, center, params, placed) {
            debug!(attempt, "checkpoint placed");
            return (candidate, true);
        }
        candidate = sample_candidate(rng, center, params);
    }

    let clear = is_clear(candidate, center, params, placed);
    (candidate, clear)
}

/// Place `count` new points, appending each one to `placed` before the next
/// is drawn so clearance is checked against the whole batch so far.
pub fn generate_positions<R: Rng + ?Sized>(
    rng: &mut R,
    center: Position,
    count: usize,
    params: &PlacementParams,
    placed: &mut Vec<Position>,
) -> Vec<Position> {
    let mut positions = Vec::with_capacity(count);
    let mut fallbacks = 0usize;

    for _ in 0..count {
        let (position, clear) = place_point(rng, center, params, placed);
        if !clear {
            fallbacks += 1;
        }
        placed.push(position);
        positions.push(position);
    }

    if fallbacks > 0 {
        warn!(
            fallbacks,
            count,
            radius_m = params.radius_m,
            "retry budget exhausted, accepted checkpoints without full clearance"
        );
    }

    positions
}

/// Place `count` points around `center` starting from an empty batch.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    center: Position,
    count: usize,
    params: &PlacementParams,
) -> Vec<Position> {
    let mut placed = Vec::with_capacity(count);
    generate_positions(rng, center, count, params, &mut placed)
}

/// Build the generated part of a hunt.
///
/// The first `count` positions take the first `count` questions; the
/// trailing `roving_count` take the rest and are flagged roving. When the
/// bank returns fewer questions than requested only that many checkpoints
/// are built.
pub fn build_checkpoints<R: Rng + ?Sized>(
    rng: &mut R,
    center: Position,
    questions: &[Question],
    count: usize,
    roving_count: usize,
    params: &PlacementParams,
) -> Vec<Checkpoint> {
    let requested = count + roving_count;
    let total = requested.min(questions.len());
    if total < requested {
        warn!(requested, available = questions.len(), "not enough questions for a full hunt");
    }

    generate(rng, center, total, params)
        .into_iter()
        .zip(questions)
        .enumerate()
        .map(|(index, (position, question))| {
            let checkpoint = Checkpoint::from_question(question, position);
            if index < count {
                checkpoint
            } else {
                checkpoint.into_roving()
            }
        })
        .collect()
}

/// Append admin-placed checkpoints verbatim. They are never checked against
/// the generated ones.
pub fn merge_custom(
    mut generated: Vec<Checkpoint>,
    custom: impl IntoIterator<Item = Checkpoint>,
) -> Vec<Checkpoint> {
    generated.extend(custom.into_iter().map(Checkpoint::into_custom));
    generated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{QuestionId, Task};
    use rand::{SeedableRng, rngs::StdRng};

    const ORIGIN: Position = Position { lat: 40.7128, lng: -74.0060 };

    fn questions(n: usize, points: u32) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                id: QuestionId(i as i64 + 1),
                question: format!("Question {i}"),
                options: vec!["a".into(), "b".into()],
                task: Task::Trivia { answer: 0 },
                points,
            })
            .collect()
    }

    fn distance(a: Position, b: Position) -> f64 {
        haversine_distance(a.to_point(), b.to_point())
    }

    #[test]
    fn test_returns_exact_count() {
        let mut rng = StdRng::seed_from_u64(1);
        for count in [0, 1, 5, 23] {
            let positions = generate(&mut rng, ORIGIN, count, &PlacementParams::with_radius(500.0));
            assert_eq!(positions.len(), count);
        }
    }

    #[test]
    fn test_feasible_batch_respects_clearance() {
        let params = PlacementParams::with_radius(500.0);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let positions = generate(&mut rng, ORIGIN, 5, &params);

            for p in &positions {
                let d = distance(ORIGIN, *p);
                assert!((6.0..=501.0).contains(&d), "seed {seed}: {d} m from center");
            }
            for (i, a) in positions.iter().enumerate() {
                for b in &positions[i + 1..] {
                    assert!(distance(*a, *b) > 6.0, "seed {seed}: points too close");
                }
            }
        }
    }

    #[test]
    fn test_infeasible_batch_still_completes() {
        let mut rng = StdRng::seed_from_u64(99);
        let params = PlacementParams {
            radius_m: 10.0,
            min_from_center_m: MIN_CLEARANCE_M,
            min_between_m: 7.0,
            max_attempts: MAX_ATTEMPTS_PER_POINT,
        };
        let positions = generate(&mut rng, ORIGIN, 50, &params);
        assert_eq!(positions.len(), 50);
    }

    #[test]
    fn test_placed_accumulator_is_cumulative() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = PlacementParams::with_radius(300.0);
        let mut placed = Vec::new();

        let first = generate_positions(&mut rng, ORIGIN, 3, &params, &mut placed);
        let second = generate_positions(&mut rng, ORIGIN, 4, &params, &mut placed);

        assert_eq!(placed.len(), 7);
        assert_eq!(&placed[..3], first.as_slice());
        assert_eq!(&placed[3..], second.as_slice());
    }

    #[test]
    fn test_same_seed_same_positions() {
        let params = PlacementParams::with_radius(500.0);
        let a = generate(&mut StdRng::seed_from_u64(42), ORIGIN, 8, &params);
        let b = generate(&mut StdRng::seed_from_u64(42), ORIGIN, 8, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_distribution_is_uniform_over_area() {
        const BINS: usize = 10;
        const SAMPLES: usize = 10_000;

        let center = Position::new(0.0, 0.0);
        let params = PlacementParams::with_radius(500.0);
        let (inner, outer) = (params.min_from_center_m, params.radius_m);

        // Equal-area annuli between the inner clearance and the radius.
        let bounds: Vec<f64> = (0..=BINS)
            .map(|k| (inner * inner + k as f64 / BINS as f64 * (outer * outer - inner * inner)).sqrt())
            .collect();

        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts = [0usize; BINS];
        for _ in 0..SAMPLES {
            let d = distance(center, sample_candidate(&mut rng, center, &params));
            let bin = bounds[1..].iter().position(|b| d < *b).unwrap_or(BINS - 1);
            counts[bin] += 1;
        }

        let expected = SAMPLES / BINS;
        for (bin, count) in counts.iter().enumerate() {
            let deviation = (*count as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.15, "bin {bin} has {count}, expected about {expected}");
        }
    }

    #[test]
    fn test_longitude_offset_widens_with_latitude() {
        // Same draws at the equator and at 60° north: latitude offsets match,
        // longitude offsets are exactly doubled.
        let params = PlacementParams::with_radius(200.0);
        let equator = Position::new(0.0, 10.0);
        let north = Position::new(60.0, 10.0);

        let a = sample_candidate(&mut StdRng::seed_from_u64(8), equator, &params);
        let b = sample_candidate(&mut StdRng::seed_from_u64(8), north, &params);

        approx::assert_relative_eq!(a.lat - equator.lat, b.lat - north.lat, epsilon = 1e-12);
        approx::assert_relative_eq!((b.lng - north.lng) / (a.lng - equator.lng), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_positions_wrap_at_antimeridian() {
        let center = Position::new(-17.0, 179.9999);
        let positions = generate(&mut StdRng::seed_from_u64(1), center, 20, &PlacementParams::with_radius(500.0));

        assert_eq!(positions.len(), 20);
        for p in &positions {
            assert!(p.is_valid(), "{p:?} is off the map");
            assert!(distance(center, *p) <= 501.0);
        }
        assert!(positions.iter().any(|p| p.lng < 0.0), "nothing landed east of the seam");
    }

    #[test]
    fn test_roving_checkpoints_trail_and_double() {
        let mut rng = StdRng::seed_from_u64(3);
        let bank = questions(5, 10);
        let checkpoints = build_checkpoints(&mut rng, ORIGIN, &bank, 3, 2, &PlacementParams::with_radius(500.0));

        assert_eq!(checkpoints.len(), 5);
        for (checkpoint, question) in checkpoints.iter().zip(&bank) {
            assert_eq!(checkpoint.id, question.id);
        }
        assert!(checkpoints[..3].iter().all(|c| !c.is_roving && c.points == 10));
        assert!(checkpoints[3..].iter().all(|c| c.is_roving && c.points == 20));
    }

    #[test]
    fn test_short_question_bank_limits_hunt() {
        let mut rng = StdRng::seed_from_u64(3);
        let checkpoints =
            build_checkpoints(&mut rng, ORIGIN, &questions(2, 10), 3, 1, &PlacementParams::with_radius(500.0));
        assert_eq!(checkpoints.len(), 2);
        assert!(checkpoints.iter().all(|c| !c.is_roving));
    }

    #[test]
    fn test_custom_checkpoints_appended_verbatim() {
        let mut rng = StdRng::seed_from_u64(4);
        let bank = questions(2, 10);
        let generated = build_checkpoints(&mut rng, ORIGIN, &bank, 2, 0, &PlacementParams::with_radius(500.0));

        // Right on top of the origin, well inside the clearance ring.
        let fixed = Checkpoint::from_question(&bank[0], ORIGIN);
        let merged = merge_custom(generated, [fixed]);

        assert_eq!(merged.len(), 3);
        let custom = &merged[2];
        assert!(custom.is_custom);
        assert_eq!(custom.position, ORIGIN);
    }
}
