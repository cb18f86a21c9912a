use std::sync::Arc;

use chrono::Utc;
use geohunt_core::roving::RovingUpdater;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::state::AppState;

/// Drive roving checkpoints on a fixed tick. A tick holds the hunts lock
/// for its whole duration, so ticks never overlap each other or a request.
pub fn spawn_roving_ticker(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(RovingUpdater::default().interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            state.tick(Utc::now()).await;
        }
    })
}
