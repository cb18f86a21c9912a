use serde::{Deserialize, Serialize};

use crate::error::{HuntError, Result};

/// Hunt configuration shared by every player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Minutes.
    pub time_limit: u32,
    pub checkpoint_count: u32,
    pub roving_count: u32,
    /// Spawn radius in meters.
    pub radius: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_limit: 30,
            checkpoint_count: 5,
            roving_count: 1,
            radius: 500.0,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.time_limit == 0 {
            return Err(HuntError::InvalidInput("time limit must be positive".into()));
        }
        if self.checkpoint_count == 0 {
            return Err(HuntError::InvalidInput("checkpoint count must be positive".into()));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(HuntError::InvalidInput(format!(
                "radius must be a positive number of meters, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}
