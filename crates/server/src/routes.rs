use std::sync::Arc;

use api_types::{
    AnswerRequest, AnswerResponse, CompleteResponse, CustomCheckpointPayload, HuntResponse, PhotoSubmission,
    PositionResponse, PositionUpdate, SettingsPayload, StartHuntRequest, StatsView,
};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use geohunt_core::checkpoint::{CustomCheckpoint, Position, QuestionId, Task};
use geohunt_core::error::HuntError;
use geohunt_core::session::{Award, HuntSession, PlayerFix};
use geohunt_core::stats::UserStats;
use geohunt_core::store::{CustomCheckpointSource, SettingsSource, StatsStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::{AppState, Hunt};
use crate::verify::PhotoCheck;
use crate::views::{
    checkpoint_view, hunt_response, proximity_view, settings_from_payload, settings_payload, stats_view,
};

type ApiResult<T> = Result<Json<T>, AppError>;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/hunts", post(start_hunt))
        .route("/hunts/{id}", get(get_hunt))
        .route("/hunts/{id}/position", post(update_position))
        .route("/hunts/{id}/answer", post(answer))
        .route("/hunts/{id}/photo", post(submit_photo))
        .route("/hunts/{id}/complete", post(complete_hunt))
        .route("/settings", get(get_settings).put(put_settings))
        .route("/custom-checkpoints", get(list_custom).post(add_custom))
        .route("/users/{id}/stats", get(user_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

fn position(lat: f64, lng: f64) -> Result<Position, AppError> {
    let position = Position::new(lat, lng);
    if position.is_valid() {
        Ok(position)
    } else {
        Err(AppError::MalformedPayload(format!("invalid coordinates {lat}, {lng}")))
    }
}

/// Compass headings a device can plausibly report, with room for clients
/// that do not fold their angles.
const HEADING_RANGE: std::ops::RangeInclusive<f64> = -360.0..=720.0;

fn heading(heading: Option<f64>) -> Result<Option<f64>, AppError> {
    match heading {
        Some(h) if !HEADING_RANGE.contains(&h) => {
            Err(AppError::MalformedPayload(format!("heading {h} is out of range")))
        }
        other => Ok(other),
    }
}

async fn start_hunt(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartHuntRequest>,
) -> Result<(StatusCode, Json<HuntResponse>), AppError> {
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::MalformedPayload("userId is required".into()));
    }
    let origin = position(request.lat, request.lng)?;

    let settings = state.store.settings()?;
    let now = Utc::now();
    let session = HuntSession::start(
        origin,
        &settings,
        state.store.as_ref(),
        state.store.as_ref(),
        state.next_seed(),
        now,
    )?;

    let id = Uuid::new_v4();
    let response = hunt_response(id, user_id, &session, now);
    state.hunts.write().await.insert(
        id,
        Hunt {
            user_id: user_id.to_string(),
            session,
        },
    );
    info!(hunt = %id, user = user_id, "hunt created");

    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_hunt(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult<HuntResponse> {
    let hunts = state.hunts.read().await;
    let hunt = hunts.get(&id).ok_or(AppError::HuntNotFound)?;
    Ok(Json(hunt_response(id, &hunt.user_id, &hunt.session, Utc::now())))
}

async fn update_position(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<PositionUpdate>,
) -> ApiResult<PositionResponse> {
    let fix = PlayerFix {
        position: position(update.lat, update.lng)?,
        heading: heading(update.heading)?,
    };

    let mut hunts = state.hunts.write().await;
    let hunt = hunts.get_mut(&id).ok_or(AppError::HuntNotFound)?;
    let observations = hunt.session.update_position(fix)?;

    Ok(Json(PositionResponse {
        checkpoints: observations.iter().map(proximity_view).collect(),
        nearby: hunt.session.nearby().iter().map(checkpoint_view).collect(),
    }))
}

/// Credit an award to the player and report the outcome.
fn settle(
    state: &AppState,
    user_id: &str,
    award: Award,
    score: u32,
    hunt_complete: bool,
) -> Result<AnswerResponse, AppError> {
    let today = Utc::now().date_naive();
    let stats = if award.correct {
        state
            .store
            .update_stats(user_id, &mut |stats: &mut UserStats| stats.award_points(award.points, today))?
    } else {
        state.store.stats(user_id)?
    };

    Ok(AnswerResponse {
        correct: award.correct,
        points_awarded: award.points,
        score,
        hunt_complete,
        stats: stats_view(&stats, today),
    })
}

async fn answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> ApiResult<AnswerResponse> {
    let player = position(request.lat, request.lng)?;

    let (user_id, award, score, complete) = {
        let mut hunts = state.hunts.write().await;
        let hunt = hunts.get_mut(&id).ok_or(AppError::HuntNotFound)?;
        let award = hunt.session.answer(
            QuestionId(request.checkpoint_id),
            request.option_index,
            player,
            Utc::now(),
        )?;
        (hunt.user_id.clone(), award, hunt.session.score(), hunt.session.is_complete())
    };

    Ok(Json(settle(&state, &user_id, award, score, complete)?))
}

async fn submit_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(submission): Json<PhotoSubmission>,
) -> ApiResult<AnswerResponse> {
    let player = position(submission.lat, submission.lng)?;
    let checkpoint_id = QuestionId(submission.checkpoint_id);
    let image = STANDARD
        .decode(submission.image_base64.as_bytes())
        .map_err(|e| AppError::MalformedPayload(format!("image is not valid base64: {e}")))?;
    let verifier = state.verifier.clone().ok_or(AppError::VerifierUnavailable)?;

    // Validate before spending a verifier call; the lock is not held across it.
    let subject = {
        let hunts = state.hunts.read().await;
        let hunt = hunts.get(&id).ok_or(AppError::HuntNotFound)?;
        let checkpoint = hunt.session.attempt(checkpoint_id, player, Utc::now())?;
        match checkpoint.task {
            Task::Photo { subject } => subject,
            Task::Trivia { .. } => {
                return Err(HuntError::WrongTask(checkpoint_id).into());
            }
        }
    };

    let verdict = verifier.verify(&PhotoCheck { image, subject }).await?;

    let (user_id, award, score, complete) = {
        let mut hunts = state.hunts.write().await;
        let hunt = hunts.get_mut(&id).ok_or(AppError::HuntNotFound)?;
        let award = hunt
            .session
            .submit_photo(checkpoint_id, verdict.matches, player, Utc::now())?;
        (hunt.user_id.clone(), award, hunt.session.score(), hunt.session.is_complete())
    };

    Ok(Json(settle(&state, &user_id, award, score, complete)?))
}

async fn complete_hunt(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> ApiResult<CompleteResponse> {
    let hunt = state.hunts.write().await.remove(&id).ok_or(AppError::HuntNotFound)?;

    let today = Utc::now().date_naive();
    let stats = state
        .store
        .update_stats(&hunt.user_id, &mut |stats: &mut UserStats| stats.complete_hunt(today))?;
    info!(hunt = %id, user = %hunt.user_id, score = hunt.session.score(), "hunt completed");

    Ok(Json(CompleteResponse {
        score: hunt.session.score(),
        stats: stats_view(&stats, today),
    }))
}

async fn get_settings(State(state): State<Arc<AppState>>) -> ApiResult<SettingsPayload> {
    Ok(Json(settings_payload(state.store.settings()?)))
}

async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SettingsPayload>,
) -> ApiResult<SettingsPayload> {
    let settings = settings_from_payload(payload);
    state.store.update_settings(settings)?;
    info!(?settings, "settings updated");
    Ok(Json(settings_payload(settings)))
}

async fn list_custom(State(state): State<Arc<AppState>>) -> ApiResult<Vec<CustomCheckpointPayload>> {
    Ok(Json(
        state
            .store
            .list_custom()?
            .into_iter()
            .map(|c| CustomCheckpointPayload {
                lat: c.lat,
                lng: c.lng,
                question_id: c.question_id.0,
            })
            .collect(),
    ))
}

async fn add_custom(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CustomCheckpointPayload>,
) -> Result<(StatusCode, Json<CustomCheckpointPayload>), AppError> {
    state.store.add_custom(CustomCheckpoint {
        lat: payload.lat,
        lng: payload.lng,
        question_id: QuestionId(payload.question_id),
    })?;
    Ok((StatusCode::CREATED, Json(payload)))
}

async fn user_stats(State(state): State<Arc<AppState>>, Path(user_id): Path<String>) -> ApiResult<StatsView> {
    let stats = state.store.stats(&user_id)?;
    Ok(Json(stats_view(&stats, Utc::now().date_naive())))
}
