//! One player's hunt, from start to the last collected checkpoint.
//!
//! The session owns its checkpoint set and its random generator. Every
//! mutation (a roving tick, a position update, an answer) is a single
//! `&mut self` call, so callers serialize them by holding the session.

use chrono::{DateTime, TimeDelta, Utc};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use crate::checkpoint::{Checkpoint, Position, QuestionId, Task};
use crate::error::{HuntError, Result};
use crate::generator::{PlacementParams, build_checkpoints, merge_custom};
use crate::proximity::{NEARBY_RADIUS_M, Proximity, Viewport, dedup_by_id, refresh_distances, sort_for_display};
use crate::roving::RovingUpdater;
use crate::settings::Settings;
use crate::spatial::{CheckpointIndex, haversine_distance};
use crate::store::{CustomCheckpointSource, QuestionSource};

/// Hunts cannot start closer to a pole than this; longitude degrees
/// collapse there and placement stops making sense.
pub const MAX_ORIGIN_LAT: f64 = 85.0;

/// Where the player is and which way the device faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerFix {
    pub position: Position,
    /// Compass heading in degrees, when the device reports one.
    pub heading: Option<f64>,
}

impl PlayerFix {
    pub fn at(position: Position) -> Self {
        Self {
            position,
            heading: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub checkpoint: Checkpoint,
    pub proximity: Proximity,
}

/// Outcome of an answer or photo submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Award {
    pub correct: bool,
    pub points: u32,
}

pub struct HuntSession {
    origin: Position,
    checkpoints: Vec<Checkpoint>,
    rng: StdRng,
    started_at: DateTime<Utc>,
    time_limit: TimeDelta,
    player: Option<PlayerFix>,
    score: u32,
    roving: RovingUpdater,
    viewport: Viewport,
}

impl HuntSession {
    /// Generate the checkpoint set around `origin` and start the clock.
    pub fn start(
        origin: Position,
        settings: &Settings,
        questions: &dyn QuestionSource,
        custom: &dyn CustomCheckpointSource,
        seed: u64,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if !origin.is_valid() {
            return Err(HuntError::InvalidInput(format!(
                "invalid coordinates {}, {}",
                origin.lat, origin.lng
            )));
        }
        if origin.lat.abs() > MAX_ORIGIN_LAT {
            return Err(HuntError::InvalidInput(format!(
                "hunts cannot start beyond {MAX_ORIGIN_LAT}° latitude"
            )));
        }
        settings.validate()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let count = settings.checkpoint_count as usize;
        let roving_count = settings.roving_count as usize;

        let sampled = questions.sample_random(&mut rng, count + roving_count)?;
        let params = PlacementParams::with_radius(settings.radius);
        let generated = build_checkpoints(&mut rng, origin, &sampled, count, roving_count, &params);

        let mut fixed = Vec::new();
        for placed in custom.list_custom()? {
            match questions.get_question(placed.question_id)? {
                Some(question) => fixed.push(Checkpoint::from_question(&question, placed.position())),
                None => warn!(question_id = %placed.question_id, "custom checkpoint references a missing question"),
            }
        }

        let checkpoints = merge_custom(generated, fixed);
        info!(
            lat = origin.lat,
            lng = origin.lng,
            checkpoints = checkpoints.len(),
            radius_m = settings.radius,
            "hunt started"
        );

        Ok(Self {
            origin,
            checkpoints,
            rng,
            started_at: now,
            time_limit: TimeDelta::minutes(i64::from(settings.time_limit)),
            player: None,
            score: 0,
            roving: RovingUpdater::default(),
            viewport: Viewport::default(),
        }
        .with_fix(PlayerFix::at(origin)))
    }

    fn with_fix(mut self, fix: PlayerFix) -> Self {
        self.record_fix(fix);
        self
    }

    /// Remember where the player is and re-measure every checkpoint from there.
    fn record_fix(&mut self, fix: PlayerFix) {
        self.player = Some(fix);
        refresh_distances(fix.position, &mut self.checkpoints);
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.started_at + self.time_limit
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.deadline() - now).max(TimeDelta::zero())
    }

    /// Every checkpoint has been collected.
    pub fn is_complete(&self) -> bool {
        self.checkpoints.iter().all(|c| c.collected)
    }

    /// Checkpoints as the player should see them: one per question id,
    /// uncollected first, nearest first.
    pub fn display_list(&self) -> Vec<Checkpoint> {
        let mut list = dedup_by_id(self.checkpoints.iter().cloned());
        sort_for_display(&mut list);
        list
    }

    /// Record a new fix and evaluate every displayed checkpoint against it.
    pub fn update_position(&mut self, fix: PlayerFix) -> Result<Vec<Observation>> {
        if !fix.position.is_valid() {
            return Err(HuntError::InvalidInput("invalid player position".into()));
        }
        self.record_fix(fix);

        Ok(self
            .display_list()
            .into_iter()
            .map(|checkpoint| Observation {
                proximity: self.viewport.evaluate(fix.position, checkpoint.position, fix.heading),
                checkpoint,
            })
            .collect())
    }

    /// Uncollected checkpoints within the nearby radius of the last fix,
    /// nearest first.
    pub fn nearby(&self) -> Vec<Checkpoint> {
        let Some(fix) = self.player else {
            return Vec::new();
        };

        let index = CheckpointIndex::build(&self.checkpoints);
        let slots = index.within(fix.position, NEARBY_RADIUS_M);
        dedup_by_id(
            slots
                .into_iter()
                .map(|slot| &self.checkpoints[slot])
                .filter(|c| !c.collected)
                .cloned(),
        )
    }

    /// Move every uncollected roving checkpoint one step.
    pub fn tick_roving(&mut self) -> usize {
        let moved = self.roving.tick_all(&mut self.rng, &mut self.checkpoints);
        if moved > 0 {
            if let Some(fix) = self.player {
                refresh_distances(fix.position, &mut self.checkpoints);
            }
            debug!(moved, "roving checkpoints moved");
        }
        moved
    }

    /// Slot of the nearest uncollected checkpoint carrying `id`.
    fn target(&self, id: QuestionId, player: Position) -> Result<usize> {
        let mut found = false;
        let mut best: Option<(usize, f64)> = None;

        for (slot, checkpoint) in self.checkpoints.iter().enumerate() {
            if checkpoint.id != id {
                continue;
            }
            found = true;
            if checkpoint.collected {
                continue;
            }
            let distance = haversine_distance(player.to_point(), checkpoint.position.to_point());
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((slot, distance));
            }
        }

        match best {
            Some((slot, distance)) if self.checkpoints[slot].is_collectible_at(distance) => Ok(slot),
            Some((_, distance_m)) => Err(HuntError::OutOfRange { distance_m }),
            None if found => Err(HuntError::AlreadyCollected(id)),
            None => Err(HuntError::CheckpointNotFound(id)),
        }
    }

    /// Check that the player at `player` may attempt checkpoint `id` now,
    /// returning a copy of it.
    pub fn attempt(&self, id: QuestionId, player: Position, now: DateTime<Utc>) -> Result<Checkpoint> {
        if self.is_expired(now) {
            return Err(HuntError::HuntExpired);
        }
        let slot = self.target(id, player)?;
        Ok(self.checkpoints[slot].clone())
    }

    /// Answer a trivia checkpoint. A correct answer collects it.
    pub fn answer(&mut self, id: QuestionId, option: usize, player: Position, now: DateTime<Utc>) -> Result<Award> {
        let checkpoint = self.attempt(id, player, now)?;
        let Task::Trivia { answer } = checkpoint.task else {
            return Err(HuntError::WrongTask(id));
        };
        if option >= checkpoint.options.len() {
            return Err(HuntError::InvalidOption(option));
        }

        self.record_fix(PlayerFix::at(player));
        if option != answer {
            debug!(question_id = %id, option, "wrong answer");
            return Ok(Award { correct: false, points: 0 });
        }

        Ok(self.collect(id, checkpoint.points))
    }

    /// Collect a photo checkpoint once the photo has been judged.
    pub fn submit_photo(&mut self, id: QuestionId, matches: bool, player: Position, now: DateTime<Utc>) -> Result<Award> {
        let checkpoint = self.attempt(id, player, now)?;
        if !checkpoint.is_photo() {
            return Err(HuntError::WrongTask(id));
        }

        self.record_fix(PlayerFix::at(player));
        if !matches {
            return Ok(Award { correct: false, points: 0 });
        }

        Ok(self.collect(id, checkpoint.points))
    }

    /// Mark every checkpoint for `id` collected; the question is done.
    fn collect(&mut self, id: QuestionId, points: u32) -> Award {
        for checkpoint in self.checkpoints.iter_mut().filter(|c| c.id == id) {
            checkpoint.collected = true;
        }
        self.score = self.score.saturating_add(points);
        info!(question_id = %id, points, score = self.score, "checkpoint collected");

        Award { correct: true, points }
    }
}
