use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use eyre::WrapErr;
use geohunt_core::session::HuntSession;
use geohunt_core::store::{MemoryStore, builtin_questions, parse_questions};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::verify::{HttpPhotoVerifier, PhotoVerifier};

/// Minutes an expired hunt stays readable and completable before it is dropped.
pub const EXPIRED_HUNT_GRACE_MINUTES: i64 = 15;

pub struct Hunt {
    pub user_id: String,
    pub session: HuntSession,
}

pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub hunts: RwLock<HashMap<Uuid, Hunt>>,
    pub verifier: Option<Arc<dyn PhotoVerifier>>,
    seed: Option<u64>,
    started: AtomicU64,
}

impl AppState {
    pub fn new(store: MemoryStore, verifier: Option<Arc<dyn PhotoVerifier>>, seed: Option<u64>) -> Arc<Self> {
        Arc::new(Self {
            store: Arc::new(store),
            hunts: RwLock::new(HashMap::new()),
            verifier,
            seed,
            started: AtomicU64::new(0),
        })
    }

    pub async fn from_config(config: &Config) -> eyre::Result<Arc<Self>> {
        let questions = match &config.questions_path {
            Some(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .wrap_err_with(|| format!("failed to read question bank {}", path.display()))?;
                parse_questions(&json)?
            }
            None => builtin_questions()?,
        };
        info!(questions = questions.len(), "question bank loaded");

        let verifier = config
            .photo_verifier_url
            .as_ref()
            .map(|url| Arc::new(HttpPhotoVerifier::new(url.clone())) as Arc<dyn PhotoVerifier>);

        Ok(Self::new(MemoryStore::new(questions, config.settings), verifier, config.seed))
    }

    /// Seed for the next hunt: derived from the configured base seed when
    /// there is one, fresh entropy otherwise.
    pub fn next_seed(&self) -> u64 {
        let n = self.started.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(base) => base.wrapping_add(n),
            None => rand::random(),
        }
    }

    /// Advance roving checkpoints in every live hunt and drop hunts that
    /// expired more than [`EXPIRED_HUNT_GRACE_MINUTES`] ago.
    pub async fn tick(&self, now: DateTime<Utc>) {
        let grace = TimeDelta::minutes(EXPIRED_HUNT_GRACE_MINUTES);
        let mut hunts = self.hunts.write().await;

        let before = hunts.len();
        hunts.retain(|_, hunt| now < hunt.session.deadline() + grace);
        let pruned = before - hunts.len();
        if pruned > 0 {
            info!(pruned, "expired hunts dropped");
        }

        let moved: usize = hunts
            .values_mut()
            .filter(|hunt| !hunt.session.is_expired(now))
            .map(|hunt| hunt.session.tick_roving())
            .sum();
        debug!(hunts = hunts.len(), moved, "roving tick");
    }
}
