//! Conversions from core types to wire types.

use api_types::{CheckpointView, DailyPointsView, HuntResponse, ProximityView, SettingsPayload, StatsView, TaskKind};
use chrono::{DateTime, NaiveDate, Utc};
use geohunt_core::checkpoint::{Checkpoint, Task};
use geohunt_core::session::{HuntSession, Observation};
use geohunt_core::settings::Settings;
use geohunt_core::stats::UserStats;
use uuid::Uuid;

pub fn checkpoint_view(checkpoint: &Checkpoint) -> CheckpointView {
    CheckpointView {
        id: checkpoint.id.0,
        lat: checkpoint.position.lat,
        lng: checkpoint.position.lng,
        question: checkpoint.question.clone(),
        options: checkpoint.options.clone(),
        kind: match checkpoint.task {
            Task::Trivia { .. } => TaskKind::Trivia,
            Task::Photo { .. } => TaskKind::Photo,
        },
        points: checkpoint.points,
        collected: checkpoint.collected,
        is_custom: checkpoint.is_custom,
        is_roving: checkpoint.is_roving,
        distance: checkpoint.distance,
    }
}

pub fn proximity_view(observation: &Observation) -> ProximityView {
    let proximity = &observation.proximity;
    ProximityView {
        checkpoint: checkpoint_view(&observation.checkpoint),
        distance: proximity.distance_m,
        bearing: proximity.bearing,
        relative_bearing: proximity.relative_bearing,
        screen_x: proximity.screen_x,
        scale: proximity.scale,
        visible: proximity.visible,
        collectible: proximity.collectible,
        nearby: proximity.nearby,
    }
}

pub fn hunt_response(id: Uuid, user_id: &str, session: &HuntSession, now: DateTime<Utc>) -> HuntResponse {
    let time_limit = (session.deadline() - session.started_at()).num_minutes();
    HuntResponse {
        hunt_id: id.to_string(),
        user_id: user_id.to_string(),
        started_at: session.started_at(),
        time_limit: u32::try_from(time_limit).unwrap_or(u32::MAX),
        remaining_seconds: session.remaining(now).num_seconds(),
        score: session.score(),
        complete: session.is_complete(),
        checkpoints: session.display_list().iter().map(checkpoint_view).collect(),
    }
}

pub fn stats_view(stats: &UserStats, today: NaiveDate) -> StatsView {
    StatsView {
        total_points: stats.total_points,
        current_streak: stats.streak_on(today),
        longest_streak: stats.longest_streak,
        last_activity_date: stats.last_activity_date,
        hunts_completed: stats.hunts_completed,
        streak_freezes: stats.streak_freezes,
        points_history: stats
            .points_history
            .iter()
            .map(|entry| DailyPointsView {
                date: entry.date,
                points: entry.points,
            })
            .collect(),
    }
}

pub fn settings_payload(settings: Settings) -> SettingsPayload {
    SettingsPayload {
        time_limit: settings.time_limit,
        checkpoint_count: settings.checkpoint_count,
        roving_count: settings.roving_count,
        radius: settings.radius,
    }
}

pub fn settings_from_payload(payload: SettingsPayload) -> Settings {
    Settings {
        time_limit: payload.time_limit,
        checkpoint_count: payload.checkpoint_count,
        roving_count: payload.roving_count,
        radius: payload.radius,
    }
}
