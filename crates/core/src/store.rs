//! Collaborators the hunt logic reads from and writes to.
//!
//! These traits define the seams to storage. [`MemoryStore`] keeps
//! everything in process and is what the server runs with.

use std::collections::HashMap;
use std::sync::RwLock;

use rand::RngCore;
use rand::seq::IndexedRandom;

use crate::checkpoint::{CustomCheckpoint, Question, QuestionId};
use crate::error::{HuntError, Result};
use crate::settings::Settings;
use crate::stats::UserStats;

const BUILTIN_QUESTIONS: &str = include_str!("../data/questions.json");

pub trait QuestionSource: Send + Sync {
    /// Up to `n` distinct questions in random order.
    fn sample_random(&self, rng: &mut dyn RngCore, n: usize) -> Result<Vec<Question>>;

    fn get_question(&self, id: QuestionId) -> Result<Option<Question>>;
}

pub trait CustomCheckpointSource: Send + Sync {
    fn list_custom(&self) -> Result<Vec<CustomCheckpoint>>;

    fn add_custom(&self, checkpoint: CustomCheckpoint) -> Result<()>;
}

pub trait SettingsSource: Send + Sync {
    fn settings(&self) -> Result<Settings>;

    fn update_settings(&self, settings: Settings) -> Result<()>;
}

pub trait StatsStore: Send + Sync {
    /// Stats for `user`, zeroed if the user has never been seen.
    fn stats(&self, user: &str) -> Result<UserStats>;

    /// Apply `update` to the user's stats and return the result.
    fn update_stats(&self, user: &str, update: &mut dyn FnMut(&mut UserStats)) -> Result<UserStats>;
}

/// Parse a JSON array of questions.
pub fn parse_questions(json: &str) -> Result<Vec<Question>> {
    let questions: Vec<Question> =
        serde_json::from_str(json).map_err(|e| HuntError::InvalidInput(format!("question bank: {e}")))?;

    for question in &questions {
        if let crate::checkpoint::Task::Trivia { answer } = question.task {
            if answer >= question.options.len() {
                return Err(HuntError::InvalidInput(format!(
                    "question {} answer {} is out of bounds",
                    question.id, answer
                )));
            }
        }
    }
    Ok(questions)
}

pub fn builtin_questions() -> Result<Vec<Question>> {
    parse_questions(BUILTIN_QUESTIONS)
}

fn poisoned<T>(_: T) -> HuntError {
    HuntError::Storage("lock poisoned".into())
}

/// In-memory implementation of every store trait.
pub struct MemoryStore {
    questions: Vec<Question>,
    custom: RwLock<Vec<CustomCheckpoint>>,
    settings: RwLock<Settings>,
    stats: RwLock<HashMap<String, UserStats>>,
}

impl MemoryStore {
    pub fn new(questions: Vec<Question>, settings: Settings) -> Self {
        Self {
            questions,
            custom: RwLock::new(Vec::new()),
            settings: RwLock::new(settings),
            stats: RwLock::new(HashMap::new()),
        }
    }
}

impl QuestionSource for MemoryStore {
    fn sample_random(&self, rng: &mut dyn RngCore, n: usize) -> Result<Vec<Question>> {
        Ok(self.questions.choose_multiple(rng, n).cloned().collect())
    }

    fn get_question(&self, id: QuestionId) -> Result<Option<Question>> {
        Ok(self.questions.iter().find(|q| q.id == id).cloned())
    }
}

impl CustomCheckpointSource for MemoryStore {
    fn list_custom(&self) -> Result<Vec<CustomCheckpoint>> {
        Ok(self.custom.read().map_err(poisoned)?.clone())
    }

    fn add_custom(&self, checkpoint: CustomCheckpoint) -> Result<()> {
        if !checkpoint.position().is_valid() {
            return Err(HuntError::InvalidInput(format!(
                "invalid coordinates {}, {}",
                checkpoint.lat, checkpoint.lng
            )));
        }
        if self.get_question(checkpoint.question_id)?.is_none() {
            return Err(HuntError::InvalidInput(format!(
                "unknown question {}",
                checkpoint.question_id
            )));
        }

        self.custom.write().map_err(poisoned)?.push(checkpoint);
        Ok(())
    }
}

impl SettingsSource for MemoryStore {
    fn settings(&self) -> Result<Settings> {
        Ok(*self.settings.read().map_err(poisoned)?)
    }

    fn update_settings(&self, settings: Settings) -> Result<()> {
        settings.validate()?;
        *self.settings.write().map_err(poisoned)? = settings;
        Ok(())
    }
}

impl StatsStore for MemoryStore {
    fn stats(&self, user: &str) -> Result<UserStats> {
        Ok(self
            .stats
            .read()
            .map_err(poisoned)?
            .get(user)
            .cloned()
            .unwrap_or_default())
    }

    fn update_stats(&self, user: &str, update: &mut dyn FnMut(&mut UserStats)) -> Result<UserStats> {
        let mut all = self.stats.write().map_err(poisoned)?;
        let stats = all.entry(user.to_string()).or_default();
        update(stats);
        Ok(stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    fn store() -> MemoryStore {
        MemoryStore::new(builtin_questions().unwrap(), Settings::default())
    }

    #[test]
    fn test_builtin_bank_parses() {
        let questions = builtin_questions().unwrap();
        assert!(questions.len() >= 10);
    }

    #[test]
    fn test_rejects_out_of_bounds_answer() {
        let json = r#"[{ "id": 1, "question": "q", "options": ["a"], "task": { "type": "trivia", "answer": 3 }, "points": 1 }]"#;
        assert!(matches!(parse_questions(json), Err(HuntError::InvalidInput(_))));
    }

    #[test]
    fn test_sample_is_distinct_and_bounded() {
        let store = store();
        let mut rng = StdRng::seed_from_u64(1);

        let sample = store.sample_random(&mut rng, 5).unwrap();
        assert_eq!(sample.len(), 5);
        let ids: HashSet<QuestionId> = sample.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 5);

        let all = store.sample_random(&mut rng, 1_000).unwrap();
        assert_eq!(all.len(), store.questions.len());
    }

    #[test]
    fn test_custom_checkpoints_validated() {
        let store = store();
        let good = CustomCheckpoint { lat: 40.0, lng: -74.0, question_id: QuestionId(1) };
        store.add_custom(good.clone()).unwrap();

        let unknown = CustomCheckpoint { question_id: QuestionId(9_999), ..good.clone() };
        assert!(store.add_custom(unknown).is_err());

        let off_map = CustomCheckpoint { lat: 120.0, ..good.clone() };
        assert!(store.add_custom(off_map).is_err());

        assert_eq!(store.list_custom().unwrap(), vec![good]);
    }

    #[test]
    fn test_settings_update_is_validated() {
        let store = store();
        let bad = Settings { radius: -1.0, ..Settings::default() };
        assert!(store.update_settings(bad).is_err());

        let good = Settings { checkpoint_count: 8, ..Settings::default() };
        store.update_settings(good).unwrap();
        assert_eq!(store.settings().unwrap(), good);
    }

    #[test]
    fn test_stats_created_lazily() {
        let store = store();
        assert_eq!(store.stats("alice").unwrap(), UserStats::default());

        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let updated = store
            .update_stats("alice", &mut |stats: &mut UserStats| stats.award_points(12, date))
            .unwrap();
        assert_eq!(updated.total_points, 12);
        assert_eq!(store.stats("alice").unwrap().total_points, 12);
        assert_eq!(store.stats("bob").unwrap().total_points, 0);
    }
}
