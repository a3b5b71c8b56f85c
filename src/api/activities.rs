//! Activity API endpoints
//!
//! Handles HTTP requests for the weekly schedule:
//! - GET /api/v1/activities - List all activity templates
//! - GET /api/v1/activities/upcoming - Soonest upcoming occurrences
//! - POST /api/v1/activities - Create a template (admin)
//! - PUT /api/v1/activities/:id - Replace a template (admin)
//! - DELETE /api/v1/activities/:id - Remove a template (admin)

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{extract_credential_token, ApiError, AppState};
use crate::models::{Activity, ActivityDraft, Occurrence};

/// Hard ceiling on the upcoming-occurrence window size
const MAX_UPCOMING_LIMIT: usize = 50;

/// Query parameters for the upcoming listing
#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<usize>,
}

/// Response for a single activity
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub day_of_week: String,
    pub start_hour: String,
    pub end_hour: String,
    pub location: Option<String>,
    pub instructor: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            title: activity.title,
            description: activity.description,
            day_of_week: activity.day_of_week.to_string(),
            start_hour: activity.start_hour,
            end_hour: activity.end_hour,
            location: activity.location,
            instructor: activity.instructor,
            created_at: activity.created_at.to_rfc3339(),
            updated_at: activity.updated_at.to_rfc3339(),
        }
    }
}

/// Response for the activity list
#[derive(Debug, Serialize)]
pub struct ActivityListResponse {
    pub activities: Vec<ActivityResponse>,
}

/// Response for one upcoming occurrence
#[derive(Debug, Serialize)]
pub struct OccurrenceResponse {
    pub activity: ActivityResponse,
    pub starts_at: String,
}

impl From<Occurrence> for OccurrenceResponse {
    fn from(occurrence: Occurrence) -> Self {
        Self {
            activity: occurrence.activity.into(),
            starts_at: occurrence.starts_at.to_rfc3339(),
        }
    }
}

/// Response for the upcoming listing
#[derive(Debug, Serialize)]
pub struct UpcomingResponse {
    pub occurrences: Vec<OccurrenceResponse>,
}

/// Acknowledgement for a deletion
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: i64,
}

/// Build the activities router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_activities).post(create_activity))
        .route("/upcoming", get(list_upcoming))
        .route("/{id}", axum::routing::put(update_activity).delete(delete_activity))
}

/// GET /api/v1/activities - List all activity templates
async fn list_activities(
    State(state): State<AppState>,
) -> Result<Json<ActivityListResponse>, ApiError> {
    let activities = state.schedule_service.list().await?;
    Ok(Json(ActivityListResponse {
        activities: activities.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/v1/activities/upcoming - Soonest upcoming occurrences
async fn list_upcoming(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<UpcomingResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.default_upcoming_limit)
        .min(MAX_UPCOMING_LIMIT);

    let occurrences = state.schedule_service.upcoming(limit).await?;
    Ok(Json(UpcomingResponse {
        occurrences: occurrences.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/v1/activities - Create a template (admin)
async fn create_activity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<ActivityDraft>,
) -> Result<(StatusCode, Json<ActivityResponse>), ApiError> {
    let token = extract_credential_token(&headers);
    let created = state
        .schedule_service
        .create(token.as_deref(), &draft)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// PUT /api/v1/activities/:id - Replace a template (admin)
async fn update_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(draft): Json<ActivityDraft>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let token = extract_credential_token(&headers);
    let updated = state
        .schedule_service
        .update(token.as_deref(), id, &draft)
        .await?;
    Ok(Json(updated.into()))
}

/// DELETE /api/v1/activities/:id - Remove a template (admin)
async fn delete_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, ApiError> {
    let token = extract_credential_token(&headers);
    state.schedule_service.delete(token.as_deref(), id).await?;
    Ok(Json(DeleteResponse { deleted: id }))
}
