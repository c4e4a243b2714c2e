use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{DiaryError, EntryDraft, EntryId, UserId};
use super::export::ExportError;
use super::repository::DiaryRepository;
use super::service::DiaryService;
use crate::auth::router::auth_error_response;
use crate::auth::AuthService;
use crate::store::PreferenceStore;
use crate::trends::DateRange;

const DEFAULT_TREND_DAYS: i64 = 90;

/// Shared handler state; every route resolves the caller from the bearer token first.
pub struct DiaryState<R> {
    pub service: Arc<DiaryService<R>>,
    pub auth: Arc<AuthService>,
    pub preferences: PreferenceStore,
}

impl<R> Clone for DiaryState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            auth: Arc::clone(&self.auth),
            preferences: self.preferences.clone(),
        }
    }
}

pub fn diary_router<R>(state: DiaryState<R>) -> Router
where
    R: DiaryRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/diary/entries",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/v1/diary/entries/:entry_id",
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route("/api/v1/diary/calendar", get(calendar_handler::<R>))
        .route("/api/v1/diary/trends", get(trends_handler::<R>))
        .route("/api/v1/diary/alerts", get(alerts_handler::<R>))
        .route("/api/v1/diary/export", get(export_handler::<R>))
        .route("/api/v1/diary/import", post(import_handler::<R>))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    pub today: Option<NaiveDate>,
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

fn diary_error_response(err: DiaryError) -> Response {
    let status = match err {
        DiaryError::Invalid(_) => StatusCode::BAD_REQUEST,
        DiaryError::NotFound => StatusCode::NOT_FOUND,
        DiaryError::Conflict => StatusCode::CONFLICT,
        DiaryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_body(status, err.to_string())
}

fn export_error_response(err: ExportError) -> Response {
    match err {
        ExportError::Diary(inner) => diary_error_response(inner),
        other => error_body(StatusCode::BAD_REQUEST, other.to_string()),
    }
}

fn caller<R>(state: &DiaryState<R>, headers: &HeaderMap) -> Result<UserId, Response> {
    state
        .auth
        .authenticate_headers(headers)
        .map(|user| user.id)
        .map_err(auth_error_response)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Both ends given: exactly that window. Otherwise `to` defaults to today and `from` to
/// 90 days before it.
fn trend_range(query: &RangeQuery) -> Result<DateRange, Response> {
    let to = query.to.unwrap_or_else(today);
    let from = query
        .from
        .unwrap_or_else(|| to - Duration::days(DEFAULT_TREND_DAYS - 1));
    DateRange::new(from, to).map_err(|err| error_body(StatusCode::BAD_REQUEST, err.to_string()))
}

pub(crate) async fn create_handler<R>(
    State(state): State<DiaryState<R>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<EntryDraft>,
) -> Response
where
    R: DiaryRepository + 'static,
{
    let user = match caller(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.service.create(&user, draft) {
        Ok(entry) => (StatusCode::CREATED, axum::Json(entry)).into_response(),
        Err(err) => diary_error_response(err),
    }
}

pub(crate) async fn list_handler<R>(
    State(state): State<DiaryState<R>>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Response
where
    R: DiaryRepository + 'static,
{
    let user = match caller(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let range = match (query.from, query.to) {
        (None, None) => None,
        _ => match trend_range(&query) {
            Ok(range) => Some(range),
            Err(response) => return response,
        },
    };
    match state.service.list(&user, range.as_ref()) {
        Ok(entries) => (StatusCode::OK, axum::Json(json!({ "entries": entries }))).into_response(),
        Err(err) => diary_error_response(err),
    }
}

pub(crate) async fn get_handler<R>(
    State(state): State<DiaryState<R>>,
    headers: HeaderMap,
    Path(entry_id): Path<String>,
) -> Response
where
    R: DiaryRepository + 'static,
{
    let user = match caller(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.service.get(&user, &EntryId(entry_id)) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(err) => diary_error_response(err),
    }
}

pub(crate) async fn update_handler<R>(
    State(state): State<DiaryState<R>>,
    headers: HeaderMap,
    Path(entry_id): Path<String>,
    axum::Json(draft): axum::Json<EntryDraft>,
) -> Response
where
    R: DiaryRepository + 'static,
{
    let user = match caller(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.service.update(&user, &EntryId(entry_id), draft) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(err) => diary_error_response(err),
    }
}

pub(crate) async fn delete_handler<R>(
    State(state): State<DiaryState<R>>,
    headers: HeaderMap,
    Path(entry_id): Path<String>,
) -> Response
where
    R: DiaryRepository + 'static,
{
    let user = match caller(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.service.delete(&user, &EntryId(entry_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => diary_error_response(err),
    }
}

pub(crate) async fn calendar_handler<R>(
    State(state): State<DiaryState<R>>,
    headers: HeaderMap,
    Query(query): Query<CalendarQuery>,
) -> Response
where
    R: DiaryRepository + 'static,
{
    let user = match caller(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.service.calendar(&user, query.year, query.month) {
        Ok(days) => (StatusCode::OK, axum::Json(json!({ "days": days }))).into_response(),
        Err(err) => diary_error_response(err),
    }
}

pub(crate) async fn trends_handler<R>(
    State(state): State<DiaryState<R>>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Response
where
    R: DiaryRepository + 'static,
{
    let user = match caller(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let range = match trend_range(&query) {
        Ok(range) => range,
        Err(response) => return response,
    };
    match state.service.trends(&user, &range) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => diary_error_response(err),
    }
}

pub(crate) async fn alerts_handler<R>(
    State(state): State<DiaryState<R>>,
    headers: HeaderMap,
    Query(query): Query<AlertsQuery>,
) -> Response
where
    R: DiaryRepository + 'static,
{
    let user = match caller(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let muted = match state.preferences.alerts_muted() {
        Ok(muted) => muted,
        Err(err) => return error_body(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    };
    let today = query.today.unwrap_or_else(today);
    match state.service.alerts(&user, today, muted) {
        Ok(alerts) => {
            let payload = json!({ "muted": muted, "alerts": alerts });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => diary_error_response(err),
    }
}

pub(crate) async fn export_handler<R>(
    State(state): State<DiaryState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: DiaryRepository + 'static,
{
    let user = match caller(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.service.export_csv(&user) {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"migraine-diary.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(err) => export_error_response(err),
    }
}

pub(crate) async fn import_handler<R>(
    State(state): State<DiaryState<R>>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    R: DiaryRepository + 'static,
{
    let user = match caller(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.service.import_csv(&user, &body) {
        Ok(entries) => {
            let payload = json!({ "imported": entries.len() });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => export_error_response(err),
    }
}
