//! Roving checkpoints wander a little on every tick.

use std::time::Duration;

use rand::Rng;

use crate::checkpoint::Checkpoint;
use crate::spatial::queries::wrap_longitude;

/// Per-axis jitter in degrees, roughly a meter.
pub const ROVING_DRIFT_DEG: f64 = 1e-5;

pub const ROVING_TICK: Duration = Duration::from_secs(2);

/// Applies an independent random nudge to each roving checkpoint per tick.
/// There is no heading or velocity carried between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RovingUpdater {
    pub drift: f64,
    pub interval: Duration,
}

impl Default for RovingUpdater {
    fn default() -> Self {
        Self {
            drift: ROVING_DRIFT_DEG,
            interval: ROVING_TICK,
        }
    }
}

impl RovingUpdater {
    /// Move `checkpoint` if it is roving and still uncollected. Returns
    /// whether it moved.
    pub fn tick<R: Rng + ?Sized>(&self, rng: &mut R, checkpoint: &mut Checkpoint) -> bool {
        if !checkpoint.is_roving || checkpoint.collected {
            return false;
        }

        let position = &mut checkpoint.position;
        position.lat = (position.lat + (rng.random::<f64>() - 0.5) * self.drift).clamp(-90.0, 90.0);
        position.lng = wrap_longitude(position.lng + (rng.random::<f64>() - 0.5) * self.drift);
        true
    }

    /// Tick every checkpoint in the set, returning how many moved.
    pub fn tick_all<R: Rng + ?Sized>(&self, rng: &mut R, checkpoints: &mut [Checkpoint]) -> usize {
        checkpoints
            .iter_mut()
            .map(|checkpoint| self.tick(rng, checkpoint))
            .filter(|moved| *moved)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{Position, Question, QuestionId, Task};
    use rand::{SeedableRng, rngs::StdRng};

    fn checkpoint(roving: bool, collected: bool) -> Checkpoint {
        let question = Question {
            id: QuestionId(1),
            question: "q".into(),
            options: vec![],
            task: Task::Trivia { answer: 0 },
            points: 5,
        };
        let mut checkpoint = Checkpoint::from_question(&question, Position::new(51.5, -0.12));
        if roving {
            checkpoint = checkpoint.into_roving();
        }
        checkpoint.collected = collected;
        checkpoint
    }

    #[test]
    fn test_default_cadence() {
        let updater = RovingUpdater::default();
        assert_eq!(updater.interval, Duration::from_secs(2));
        assert_eq!(updater.drift, ROVING_DRIFT_DEG);
    }

    #[test]
    fn test_only_uncollected_roving_checkpoints_move() {
        let updater = RovingUpdater::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut set = vec![
            checkpoint(true, false),
            checkpoint(true, true),
            checkpoint(false, false),
        ];
        let before = set.clone();

        assert_eq!(updater.tick_all(&mut rng, &mut set), 1);
        assert_ne!(set[0].position, before[0].position);
        assert_eq!(set[1], before[1]);
        assert_eq!(set[2], before[2]);
    }

    #[test]
    fn test_each_step_is_bounded_by_half_drift() {
        let updater = RovingUpdater::default();
        let mut rng = StdRng::seed_from_u64(12);
        let mut roving = checkpoint(true, false);

        for _ in 0..1_000 {
            let previous = roving.position;
            updater.tick(&mut rng, &mut roving);
            assert!((roving.position.lat - previous.lat).abs() <= updater.drift / 2.0);
            assert!((roving.position.lng - previous.lng).abs() <= updater.drift / 2.0);
        }
    }

    #[test]
    fn test_walk_stays_on_the_map_at_the_antimeridian() {
        let updater = RovingUpdater { drift: 0.5, ..RovingUpdater::default() };
        let mut rng = StdRng::seed_from_u64(14);
        let mut roving = checkpoint(true, false);
        roving.position = Position::new(10.0, 179.99);

        let mut crossed = false;
        for _ in 0..1_000 {
            updater.tick(&mut rng, &mut roving);
            assert!(roving.position.is_valid(), "{:?} is off the map", roving.position);
            crossed |= roving.position.lng < 0.0;
        }
        assert!(crossed);
    }

    #[test]
    fn test_seeded_walk_is_reproducible() {
        let updater = RovingUpdater::default();
        let mut a = checkpoint(true, false);
        let mut b = checkpoint(true, false);
        let mut rng_a = StdRng::seed_from_u64(13);
        let mut rng_b = StdRng::seed_from_u64(13);

        for _ in 0..10 {
            updater.tick(&mut rng_a, &mut a);
            updater.tick(&mut rng_b, &mut b);
        }
        assert_eq!(a.position, b.position);
    }
}
