//! JSON bodies exchanged between the hunt server and its clients.
//!
//! Field names are camelCase on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartHuntRequest {
    pub user_id: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Trivia,
    Photo,
}

/// A checkpoint as shown to the player. Never carries the answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointView {
    pub id: i64,
    pub lat: f64,
    pub lng: f64,
    pub question: String,
    pub options: Vec<String>,
    pub kind: TaskKind,
    pub points: u32,
    pub collected: bool,
    pub is_custom: bool,
    pub is_roving: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HuntResponse {
    pub hunt_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub time_limit: u32,
    pub remaining_seconds: i64,
    pub score: u32,
    pub complete: bool,
    pub checkpoints: Vec<CheckpointView>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub heading: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityView {
    pub checkpoint: CheckpointView,
    pub distance: f64,
    pub bearing: f64,
    pub relative_bearing: f64,
    pub screen_x: f64,
    pub scale: f64,
    pub visible: bool,
    pub collectible: bool,
    pub nearby: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionResponse {
    pub checkpoints: Vec<ProximityView>,
    pub nearby: Vec<CheckpointView>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub checkpoint_id: i64,
    pub option_index: usize,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSubmission {
    pub checkpoint_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub image_base64: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub correct: bool,
    pub points_awarded: u32,
    pub score: u32,
    pub hunt_complete: bool,
    pub stats: StatsView,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub score: u32,
    pub stats: StatsView,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPointsView {
    pub date: NaiveDate,
    pub points: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub total_points: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub hunts_completed: u32,
    pub streak_freezes: u32,
    pub points_history: Vec<DailyPointsView>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    /// Minutes.
    pub time_limit: u32,
    pub checkpoint_count: u32,
    pub roving_count: u32,
    /// Meters.
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCheckpointPayload {
    pub lat: f64,
    pub lng: f64,
    pub question_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
