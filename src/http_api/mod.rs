use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{NaiveDate, Weekday};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::calendar::{self, parse_date_key};
use crate::{
    CalendarCell, ClassRecord, DayClassification, DayType, HomeworkItem, LedgerError, Planner,
    ProgressSummary, ScheduleSettings, ScheduleType, StudySession, UserKey, UserProfile,
};

#[derive(Clone)]
pub struct AppState {
    planner: Arc<RwLock<Planner>>,
}

impl AppState {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner: Arc::new(RwLock::new(planner)),
        }
    }

    pub fn with_shared(planner: Arc<RwLock<Planner>>) -> Self {
        Self { planner }
    }

    fn planner(&self) -> Arc<RwLock<Planner>> {
        self.planner.clone()
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
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<LedgerError> for ApiError {
    fn from(value: LedgerError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// `?today=YYYY-MM-DD` pins "today" for relative queries; defaults to the local date.
#[derive(Debug, Default, Deserialize)]
struct AsOf {
    today: Option<String>,
}

impl AsOf {
    fn resolve(&self) -> Result<NaiveDate, ApiError> {
        match self.today.as_deref() {
            Some(raw) => parse_day(raw),
            None => Ok(calendar::today_local()),
        }
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate, ApiError> {
    parse_date_key(raw).ok_or_else(|| ApiError::invalid(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

#[derive(Debug, Deserialize)]
struct OverridePayload {
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassPayload {
    name: String,
    #[serde(default)]
    color: String,
    schedule_type: ScheduleType,
    #[serde(default)]
    days_of_week: Vec<String>,
}

impl ClassPayload {
    fn weekdays(&self) -> Result<Vec<Weekday>, ApiError> {
        self.days_of_week
            .iter()
            .map(|name| {
                calendar::parse_weekday(name)
                    .ok_or_else(|| ApiError::invalid(format!("invalid weekday '{name}'")))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HomeworkPayload {
    title: String,
    #[serde(default)]
    class_id: String,
    due_date: String,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    homework_id: Option<String>,
    start_time: Option<String>,
    duration_minutes: u32,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    user: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DayDetail {
    date: NaiveDate,
    classification: DayClassification,
    #[serde(rename = "override")]
    forced: Option<DayType>,
    classes: Vec<ClassRecord>,
    homework: Vec<HomeworkItem>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session", get(current_session))
        .route("/login", post(login))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/settings", get(get_settings).put(put_settings).delete(clear_settings))
        .route("/overrides", get(list_overrides))
        .route("/overrides/:date", put(put_override))
        .route("/days/:date", get(day_detail))
        .route("/classes", get(list_classes).post(create_class))
        .route("/classes/:id", put(update_class).delete(delete_class))
        .route("/homework", get(list_homework).post(create_homework))
        .route(
            "/homework/:id",
            get(get_homework).put(update_homework).delete(delete_homework),
        )
        .route("/homework/:id/toggle", post(toggle_homework))
        .route("/due/today", get(due_today))
        .route("/due/tomorrow", get(due_tomorrow))
        .route("/streak", get(streak))
        .route("/nudge", get(nudge))
        .route("/sessions", get(list_sessions).post(record_session))
        .route("/progress", get(progress))
        .route("/month/:year/:month", get(month_view))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, planner: Planner) -> std::io::Result<()> {
    let state = AppState::new(planner);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn current_session(State(state): State<AppState>) -> impl IntoResponse {
    let planner = state.planner();
    let guard = planner.read();
    Json(json!({
        "user": guard.user().as_str(),
        "guest": guard.is_guest(),
    }))
}

async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> impl IntoResponse {
    let user = UserKey::from_login(payload.user.as_deref());
    let planner = state.planner();
    let mut guard = planner.write();
    if user.is_guest() {
        guard.logout();
    } else {
        guard.switch_user(user);
    }
    Json(json!({
        "user": guard.user().as_str(),
        "guest": guard.is_guest(),
    }))
}

async fn get_profile(State(state): State<AppState>) -> Json<UserProfile> {
    let planner = state.planner();
    let profile = planner.read().profile().clone();
    Json(profile)
}

async fn update_profile(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Json<UserProfile> {
    let planner = state.planner();
    planner.write().update_profile(profile.clone());
    Json(profile)
}

async fn get_settings(State(state): State<AppState>) -> Json<Option<ScheduleSettings>> {
    let planner = state.planner();
    let settings = planner.read().settings().cloned();
    Json(settings)
}

async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<ScheduleSettings>,
) -> Json<ScheduleSettings> {
    let planner = state.planner();
    planner.write().set_schedule_settings(Some(settings.clone()));
    Json(settings)
}

async fn clear_settings(State(state): State<AppState>) -> StatusCode {
    let planner = state.planner();
    planner.write().set_schedule_settings(None);
    StatusCode::NO_CONTENT
}

async fn list_overrides(State(state): State<AppState>) -> impl IntoResponse {
    let planner = state.planner();
    let guard = planner.read();
    Json(guard.overrides().clone())
}

async fn put_override(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<OverridePayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = parse_day(&date)?;
    let kind: DayClassification = payload
        .kind
        .parse()
        .map_err(|_| ApiError::invalid(format!("unknown day kind '{}'", payload.kind)))?;
    let planner = state.planner();
    let classification = {
        let mut guard = planner.write();
        guard.set_override(date, kind);
        guard.classify(date)
    };
    Ok(Json(json!({
        "date": calendar::date_key(&date),
        "classification": classification,
    })))
}

async fn day_detail(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayDetail>, ApiError> {
    let date = parse_day(&date)?;
    let planner = state.planner();
    let guard = planner.read();
    Ok(Json(DayDetail {
        date,
        classification: guard.classify(date),
        forced: guard.get_override(date),
        classes: guard.classes_scheduled_on(date).into_iter().cloned().collect(),
        homework: guard.homework_on(date).into_iter().cloned().collect(),
    }))
}

async fn list_classes(State(state): State<AppState>) -> Json<Vec<ClassRecord>> {
    let planner = state.planner();
    let classes = planner.read().classes().to_vec();
    Json(classes)
}

async fn create_class(
    State(state): State<AppState>,
    Json(payload): Json<ClassPayload>,
) -> Result<(StatusCode, Json<ClassRecord>), ApiError> {
    let days = payload.weekdays()?;
    let planner = state.planner();
    let class = planner
        .write()
        .add_class(&payload.name, &payload.color, payload.schedule_type, days)?;
    Ok((StatusCode::CREATED, Json(class)))
}

async fn update_class(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    Json(payload): Json<ClassPayload>,
) -> Result<Json<ClassRecord>, ApiError> {
    let days = payload.weekdays()?;
    let class = ClassRecord::new(class_id.clone(), payload.name.trim(), payload.color, payload.schedule_type)
        .with_days(days);
    let planner = state.planner();
    let updated = {
        let mut guard = planner.write();
        if !guard.update_class(class)? {
            return Err(ApiError::not_found(format!("class {class_id} not found")));
        }
        guard.find_class(&class_id).cloned()
    };
    updated
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("class {class_id} not found")))
}

async fn delete_class(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    let removed = planner.write().delete_class(&class_id);
    if !removed {
        return Err(ApiError::not_found(format!("class {class_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_homework(State(state): State<AppState>) -> Json<Vec<HomeworkItem>> {
    let planner = state.planner();
    let homework = planner.read().homework().to_vec();
    Json(homework)
}

async fn get_homework(
    State(state): State<AppState>,
    Path(homework_id): Path<String>,
) -> Result<Json<HomeworkItem>, ApiError> {
    let planner = state.planner();
    let found = planner.read().find_homework(&homework_id).cloned();
    found
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("homework {homework_id} not found")))
}

fn parse_due(raw: &str) -> Result<chrono::NaiveDateTime, ApiError> {
    calendar::parse_instant(raw).ok_or_else(|| ApiError::invalid(format!("invalid due date '{raw}'")))
}

async fn create_homework(
    State(state): State<AppState>,
    Json(payload): Json<HomeworkPayload>,
) -> Result<(StatusCode, Json<HomeworkItem>), ApiError> {
    let mut item = HomeworkItem::draft(payload.title.trim(), payload.class_id, parse_due(&payload.due_date)?);
    item.notes = payload.notes;
    let planner = state.planner();
    planner.write().add_or_update_homework(item.clone())?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_homework(
    State(state): State<AppState>,
    Path(homework_id): Path<String>,
    Json(item): Json<HomeworkItem>,
) -> Result<Json<HomeworkItem>, ApiError> {
    if item.id != homework_id {
        return Err(ApiError::invalid("homework id in payload does not match path parameter"));
    }
    let planner = state.planner();
    {
        let mut guard = planner.write();
        if guard.find_homework(&homework_id).is_none() {
            return Err(ApiError::not_found(format!("homework {homework_id} not found")));
        }
        guard.add_or_update_homework(item.clone())?;
    }
    Ok(Json(item))
}

async fn delete_homework(
    State(state): State<AppState>,
    Path(homework_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    let removed = planner.write().delete_homework(&homework_id);
    if !removed {
        return Err(ApiError::not_found(format!("homework {homework_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_homework(
    State(state): State<AppState>,
    Path(homework_id): Path<String>,
) -> Result<Json<HomeworkItem>, ApiError> {
    let planner = state.planner();
    let toggled = {
        let mut guard = planner.write();
        if guard.toggle_complete(&homework_id) {
            guard.find_homework(&homework_id).cloned()
        } else {
            None
        }
    };
    toggled
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("homework {homework_id} not found")))
}

async fn due_today(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<Vec<HomeworkItem>>, ApiError> {
    let today = as_of.resolve()?;
    let planner = state.planner();
    let guard = planner.read();
    Ok(Json(guard.homework_due_today(today).into_iter().cloned().collect()))
}

async fn due_tomorrow(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<Vec<HomeworkItem>>, ApiError> {
    let today = as_of.resolve()?;
    let planner = state.planner();
    let guard = planner.read();
    Ok(Json(guard.homework_due_tomorrow(today).into_iter().cloned().collect()))
}

async fn streak(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let today = as_of.resolve()?;
    let planner = state.planner();
    let days = planner.read().completion_streak(today);
    Ok(Json(json!({ "days": days })))
}

async fn nudge(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let today = as_of.resolve()?;
    let planner = state.planner();
    let message = {
        let mut rng = rand::rng();
        planner.read().upcoming_nudge(today, &mut rng)
    };
    Ok(Json(json!({ "message": message })))
}

async fn list_sessions(State(state): State<AppState>) -> Json<Vec<StudySession>> {
    let planner = state.planner();
    let sessions = planner.read().sessions().to_vec();
    Json(sessions)
}

async fn record_session(
    State(state): State<AppState>,
    Json(payload): Json<SessionPayload>,
) -> Result<(StatusCode, Json<StudySession>), ApiError> {
    let start_time = match payload.start_time.as_deref() {
        Some(raw) => calendar::parse_instant(raw)
            .ok_or_else(|| ApiError::invalid(format!("invalid start time '{raw}'")))?,
        None => calendar::now_local(),
    };
    let homework_id = payload.homework_id.as_deref().filter(|id| !id.trim().is_empty());
    let planner = state.planner();
    let session = planner
        .write()
        .record_session(homework_id, start_time, payload.duration_minutes)?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn progress(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<ProgressSummary>, ApiError> {
    let today = as_of.resolve()?;
    let planner = state.planner();
    let summary = planner.read().progress(today);
    Ok(Json(summary))
}

async fn month_view(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<Vec<CalendarCell>>, ApiError> {
    if !(1..=12).contains(&month) {
        return Err(ApiError::invalid(format!("invalid month {month}")));
    }
    let today = as_of.resolve()?;
    let planner = state.planner();
    let cells = planner.read().month_view(year, month, today);
    if cells.is_empty() {
        return Err(ApiError::invalid(format!("month {year}-{month:02} is out of range")));
    }
    Ok(Json(cells))
}
