//! Per-player points and streak bookkeeping.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of most recent days kept in the points history.
pub const HISTORY_DAYS: usize = 30;

/// A streak freeze is earned every time the streak reaches a multiple of this.
pub const FREEZE_EVERY_DAYS: u32 = 7;

pub const MAX_STREAK_FREEZES: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoints {
    pub date: NaiveDate,
    pub points: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_points: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub hunts_completed: u32,
    pub streak_freezes: u32,
    /// Oldest first, at most [`HISTORY_DAYS`] entries.
    pub points_history: Vec<DailyPoints>,
}

impl UserStats {
    pub fn award_points(&mut self, points: u32, date: NaiveDate) {
        self.total_points = self.total_points.saturating_add(points as u64);

        match self.points_history.binary_search_by_key(&date, |entry| entry.date) {
            Ok(slot) => {
                let entry = &mut self.points_history[slot];
                entry.points = entry.points.saturating_add(points as u64);
            }
            Err(slot) => {
                self.points_history.insert(
                    slot,
                    DailyPoints {
                        date,
                        points: points as u64,
                    },
                );
            }
        }

        if self.points_history.len() > HISTORY_DAYS {
            let excess = self.points_history.len() - HISTORY_DAYS;
            self.points_history.drain(..excess);
        }
    }

    /// Record a finished hunt on `date` and advance the streak.
    ///
    /// A second hunt on the same day leaves the streak alone. Missed days
    /// are bridged by spending one freeze each when enough are banked;
    /// otherwise the streak restarts at 1.
    pub fn complete_hunt(&mut self, date: NaiveDate) {
        self.hunts_completed = self.hunts_completed.saturating_add(1);

        let previous = self.current_streak;
        match self.last_activity_date {
            Some(last) if date <= last => return,
            Some(last) => {
                let missed = (date - last).num_days() - 1;
                if missed == 0 {
                    self.current_streak += 1;
                } else if i64::from(self.streak_freezes) >= missed {
                    self.streak_freezes -= missed as u32;
                    self.current_streak += 1;
                } else {
                    self.current_streak = 1;
                }
            }
            None => self.current_streak = 1,
        }

        if self.current_streak > previous && self.current_streak % FREEZE_EVERY_DAYS == 0 {
            self.streak_freezes = (self.streak_freezes + 1).min(MAX_STREAK_FREEZES);
        }

        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_activity_date = Some(date);
    }

    /// The streak as it stands on `today`: zero once the gap since the last
    /// hunt is wider than the banked freezes can cover.
    pub fn streak_on(&self, today: NaiveDate) -> u32 {
        match self.last_activity_date {
            Some(last) => {
                let missed = (today - last).num_days() - 1;
                if missed <= i64::from(self.streak_freezes) {
                    self.current_streak
                } else {
                    0
                }
            }
            None => 0,
        }
    }

    pub fn points_on(&self, date: NaiveDate) -> u64 {
        self.points_history
            .iter()
            .find(|entry| entry.date == date)
            .map_or(0, |entry| entry.points)
    }
}
