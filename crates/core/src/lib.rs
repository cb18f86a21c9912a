//! # geohunt-core
//!
//! Location-based trivia hunts: checkpoint placement around a player,
//! wandering roving checkpoints, and the distance/bearing evaluation that
//! gates collection and drives the AR view.
//!
//! ## Example
//!
//! ```
//! use geohunt_core::prelude::*;
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let center = Position::new(40.7128, -74.0060);
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let positions = generate(&mut rng, center, 5, &PlacementParams::with_radius(500.0));
//! assert_eq!(positions.len(), 5);
//!
//! let view = Viewport::default().evaluate(center, positions[0], Some(0.0));
//! assert!(view.distance_m >= 6.0 && view.distance_m <= 501.0);
//! ```

pub mod checkpoint;
pub mod error;
pub mod generator;
pub mod proximity;
pub mod roving;
pub mod session;
pub mod settings;
pub mod spatial;
pub mod stats;
pub mod store;

pub mod prelude {
    pub use crate::checkpoint::{Checkpoint, CustomCheckpoint, Position, Question, QuestionId, Task};
    pub use crate::error::{HuntError, Result};
    pub use crate::generator::{PlacementParams, build_checkpoints, generate, generate_positions, merge_custom};
    pub use crate::proximity::{
        COLLECTION_RADIUS_M, NEARBY_RADIUS_M, Proximity, Viewport, dedup_by_id, sort_for_display,
    };
    pub use crate::roving::RovingUpdater;
    pub use crate::session::{Award, HuntSession, Observation, PlayerFix};
    pub use crate::settings::Settings;
    pub use crate::stats::UserStats;
    pub use crate::store::{CustomCheckpointSource, MemoryStore, QuestionSource, SettingsSource, StatsStore};
}

pub use prelude::*;
