//! Checkpoint and question records.

use std::fmt;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::proximity::COLLECTION_RADIUS_M;

/// Latitude/longitude pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn to_point(self) -> Point {
        Point::new(self.lng, self.lat)
    }
}

impl From<Position> for Point {
    fn from(position: Position) -> Self {
        position.to_point()
    }
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self {
            lat: point.y(),
            lng: point.x(),
        }
    }
}

/// Identifier of the question behind a checkpoint.
///
/// Not unique across a hunt: a roving and a stationary checkpoint, or a
/// custom one, may point at the same question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub i64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the player has to do to collect a checkpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Task {
    /// Pick the option at `answer`.
    Trivia { answer: usize },
    /// Photograph something matching `subject`.
    Photo { subject: String },
}

/// A question as served by the question bank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub task: Task,
    pub points: u32,
}

/// Admin-placed checkpoint. Coordinates are trusted as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCheckpoint {
    pub lat: f64,
    pub lng: f64,
    pub question_id: QuestionId,
}

impl CustomCheckpoint {
    pub fn position(&self) -> Position {
        Position::new(self.lat, self.lng)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    pub id: QuestionId,
    pub position: Position,
    pub question: String,
    pub options: Vec<String>,
    pub task: Task,
    pub points: u32,
    pub collected: bool,
    pub is_custom: bool,
    pub is_roving: bool,
    /// Meters from the player at the last position update.
    pub distance: Option<f64>,
}

impl Checkpoint {
    pub fn from_question(question: &Question, position: Position) -> Self {
        Self {
            id: question.id,
            position,
            question: question.question.clone(),
            options: question.options.clone(),
            task: question.task.clone(),
            points: question.points,
            collected: false,
            is_custom: false,
            is_roving: false,
            distance: None,
        }
    }

    /// Roving checkpoints are worth double.
    pub fn into_roving(mut self) -> Self {
        self.is_roving = true;
        self.points = self.points.saturating_mul(2);
        self
    }

    pub fn into_custom(mut self) -> Self {
        self.is_custom = true;
        self
    }

    pub fn is_photo(&self) -> bool {
        matches!(self.task, Task::Photo { .. })
    }

    /// Whether a player `distance_m` away may collect this checkpoint.
    pub fn is_collectible_at(&self, distance_m: f64) -> bool {
        !self.collected && distance_m < COLLECTION_RADIUS_M
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trivia(points: u32) -> Question {
        Question {
            id: QuestionId(7),
            question: "Capital of France?".into(),
            options: vec!["Paris".into(), "Lyon".into()],
            task: Task::Trivia { answer: 0 },
            points,
        }
    }

    #[test]
    fn test_position_point_axes() {
        let position = Position::new(40.7, -74.0);
        let point = position.to_point();
        assert_eq!(point.x(), -74.0);
        assert_eq!(point.y(), 40.7);
        assert_eq!(Position::from(point), position);
    }

    #[test]
    fn test_position_validity() {
        assert!(Position::new(89.9, 179.9).is_valid());
        assert!(!Position::new(90.1, 0.0).is_valid());
        assert!(!Position::new(0.0, -180.5).is_valid());
        assert!(!Position::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_roving_doubles_points() {
        let checkpoint = Checkpoint::from_question(&trivia(10), Position::new(0.0, 0.0)).into_roving();
        assert!(checkpoint.is_roving);
        assert_eq!(checkpoint.points, 20);
    }

    #[test]
    fn test_collection_gate_is_strict() {
        let checkpoint = Checkpoint::from_question(&trivia(10), Position::new(0.0, 0.0));
        assert!(checkpoint.is_collectible_at(19.9));
        assert!(!checkpoint.is_collectible_at(20.0));

        let mut collected = checkpoint.clone();
        collected.collected = true;
        assert!(!collected.is_collectible_at(1.0));
    }

    #[test]
    fn test_question_json_shape() {
        let json = r#"{
            "id": 3,
            "question": "Find a red door",
            "task": { "type": "photo", "subject": "a red door" },
            "points": 15
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.id, QuestionId(3));
        assert!(question.options.is_empty());
        assert_eq!(question.task, Task::Photo { subject: "a red door".into() });
    }
}
