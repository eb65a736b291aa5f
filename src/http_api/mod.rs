use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use chrono::{Local, NaiveDate, NaiveTime};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{Forecast, ForecastError, HeatmapGrid, Task, TaskId, Worklist, WorklistError};

#[derive(Clone)]
pub struct AppState {
    worklist: Arc<RwLock<Worklist>>,
}

impl AppState {
    pub fn new(worklist: Worklist) -> Self {
        Self {
            worklist: Arc::new(RwLock::new(worklist)),
        }
    }

    pub fn with_shared(worklist: Arc<RwLock<Worklist>>) -> Self {
        Self { worklist }
    }

    fn worklist(&self) -> Arc<RwLock<Worklist>> {
        self.worklist.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<WorklistError> for ApiError {
    fn from(value: WorklistError) -> Self {
        match value {
            WorklistError::TaskNotFound(_) => ApiError::NotFound(value.to_string()),
            WorklistError::Validation(crate::task_validation::TaskValidationError::DuplicateId(
                _,
            )) => ApiError::Conflict(value.to_string()),
            WorklistError::Validation(_)
            | WorklistError::Calendar(_)
            | WorklistError::Forecast(ForecastError::DateOutOfRange { .. }) => {
                ApiError::Invalid(value.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                tracing::error!(%message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// `today` as `YYYY-MM-DD` and `now` as `HH:MM`; both default to the local clock.
#[derive(Debug, Default, Deserialize)]
struct ClockQuery {
    today: Option<String>,
    now: Option<String>,
}

impl ClockQuery {
    fn resolve(&self) -> Result<(NaiveDate, NaiveTime), ApiError> {
        let local = Local::now().naive_local();
        let today = match self.today.as_deref() {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| ApiError::invalid(format!("invalid today '{raw}'")))?,
            None => local.date(),
        };
        let now = match self.now.as_deref() {
            Some(raw) => parse_clock_time(raw)
                .ok_or_else(|| ApiError::invalid(format!("invalid now '{raw}'")))?,
            None => local.time(),
        };
        Ok((today, now))
    }
}

fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn parse_day(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::invalid(format!("invalid date '{raw}'")))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/vacations", get(list_vacations))
        .route("/vacations/:date", put(mark_vacation).delete(unmark_vacation))
        .route("/forecast", get(get_forecast))
        .route("/heatmap", get(get_heatmap))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, worklist: Worklist) -> std::io::Result<()> {
    let state = AppState::new(worklist);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    let worklist = state.worklist();
    let tasks = {
        let guard = worklist.read();
        guard.tasks().cloned().collect()
    };
    Json(tasks)
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    let worklist = state.worklist();
    let result = {
        let guard = worklist.read();
        guard.find_task(task_id).cloned()
    };
    match result {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::not_found(format!("task {task_id} not found"))),
    }
}

async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let worklist = state.worklist();
    {
        let mut guard = worklist.write();
        guard.insert_task(task.clone())?;
    }
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
    Json(task): Json<Task>,
) -> Result<Json<Task>, ApiError> {
    if task.id != task_id {
        return Err(ApiError::invalid(
            "task id in payload does not match path parameter",
        ));
    }
    let worklist = state.worklist();
    {
        let mut guard = worklist.write();
        if guard.find_task(task_id).is_none() {
            return Err(ApiError::not_found(format!("task {task_id} not found")));
        }
        guard.upsert_task(task.clone())?;
    }
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> Result<StatusCode, ApiError> {
    let worklist = state.worklist();
    {
        let mut guard = worklist.write();
        guard.delete_task(task_id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_vacations(State(state): State<AppState>) -> Json<Vec<NaiveDate>> {
    let worklist = state.worklist();
    let vacations = worklist.read().calendar().vacations();
    Json(vacations)
}

async fn mark_vacation(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<StatusCode, ApiError> {
    let date = parse_day(&date)?;
    state.worklist().write().mark_vacation(date);
    Ok(StatusCode::NO_CONTENT)
}

async fn unmark_vacation(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<StatusCode, ApiError> {
    let date = parse_day(&date)?;
    state.worklist().write().unmark_vacation(date);
    Ok(StatusCode::NO_CONTENT)
}

async fn get_forecast(
    State(state): State<AppState>,
    Query(clock): Query<ClockQuery>,
) -> Result<Json<Forecast>, ApiError> {
    let (today, now) = clock.resolve()?;
    let worklist = state.worklist();
    let forecast = {
        let guard = worklist.read();
        guard.forecast(today, now)?
    };
    Ok(Json(forecast))
}

async fn get_heatmap(
    State(state): State<AppState>,
    Query(clock): Query<ClockQuery>,
) -> Result<Json<HeatmapGrid>, ApiError> {
    let (today, now) = clock.resolve()?;
    let worklist = state.worklist();
    let grid = {
        let guard = worklist.read();
        guard.heatmap(today, now)?
    };
    Ok(Json(grid))
}
