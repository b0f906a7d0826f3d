use crate::availability::{classify_day, weekday_name, ResolvedSlot};
use crate::backend::AppointmentBackend;
use crate::configuration::Configuration;
use crate::error::StoreError;
use crate::types::{
    is_slot_time, parse_flexible_date, Appointment, AppointmentStatus, AppointmentUpdate,
    DayBlock, DaySnapshot, NewAppointment,
};
use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use validator::Validate;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

#[derive(Clone)]
pub struct AppState<T, C> {
    pub store: T,
    pub configuration: C,
}

/// Backend error wrapper so handlers can use `?`; renders the same JSON
/// error body the browser panels expect.
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            StoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAppointmentRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: String,
    pub date: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRequest {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDayRequest {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub date: NaiveDate,
    pub weekday: String,
    pub slots: Vec<ResolvedSlot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayBlocksResponse {
    pub items: Vec<DayBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub ok: bool,
    pub removed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct Ack {
    ok: bool,
}

pub fn create_app<T: AppointmentBackend, C: Configuration>(store: T, configuration: C) -> Router {
    let state = AppState {
        store,
        configuration,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route(
            "/appointments",
            get(list_appointments::<T, C>).post(create_appointment::<T, C>),
        )
        .route("/availability", get(day_availability::<T, C>))
        .route("/day-blocks", get(list_day_blocks::<T, C>));

    let admin = Router::new()
        .route("/appointments", delete(purge_appointments::<T, C>))
        .route(
            "/appointments/:id",
            patch(update_appointment::<T, C>).delete(delete_appointment::<T, C>),
        )
        .route("/slots/block", post(block_slot::<T, C>))
        .route("/slots/unblock", post(unblock_slot::<T, C>))
        .route("/day-blocks", post(block_day::<T, C>))
        .route("/day-blocks/:date", delete(unblock_day::<T, C>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth::<T, C>,
        ));

    Router::new()
        .merge(public)
        .merge(admin)
        .with_state(state)
        .layer(cors)
}

async fn admin_auth<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    if let Some(auth_header) = request.headers().get(ADMIN_PASSWORD_HEADER) {
        if auth_header.to_str().unwrap_or("") != state.configuration.admin_password() {
            return Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()));
        }
    } else {
        return Err((StatusCode::UNAUTHORIZED, "Missing credentials".to_string()));
    }
    Ok(next.run(request).await)
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    parse_flexible_date(raw)
        .ok_or_else(|| StoreError::Validation(format!("Invalid date: {raw}")).into())
}

fn parse_time(raw: &str) -> Result<(), ApiError> {
    if is_slot_time(raw) {
        Ok(())
    } else {
        Err(StoreError::Validation(format!("Invalid time: {raw}")).into())
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    date: Option<String>,
    status: Option<String>,
}

async fn list_appointments<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<DaySnapshot>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|raw| raw.parse::<AppointmentStatus>())
        .transpose()
        .map_err(StoreError::Validation)?;

    match query.date.as_deref() {
        Some(raw) => {
            let date = parse_date(raw)?;
            let mut snapshot = state.store.day_snapshot(date);
            if let Some(status) = status {
                snapshot.items.retain(|a| a.status == status);
            }
            Ok(Json(snapshot))
        }
        None => Ok(Json(DaySnapshot {
            items: state.store.list(status),
            day_block: None,
        })),
    }
}

async fn create_appointment<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    request
        .validate()
        .map_err(|err| StoreError::Validation(err.to_string()))?;
    let date = parse_date(&request.date)?;
    parse_time(&request.time)?;
    let service = request
        .service
        .and_then(|s| {
            let s = s.trim().to_string();
            (!s.is_empty()).then_some(s)
        });

    let appointment = state.store.create(NewAppointment {
        client_name: request.name.trim().to_string(),
        phone: request.phone,
        date,
        time: request.time,
        service,
    })?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[derive(Debug, Deserialize)]
struct DateQuery {
    date: String,
}

async fn day_availability<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let date = parse_date(&query.date)?;
    let snapshot = state.store.day_snapshot(date);
    let slots = classify_day(date.weekday(), &snapshot.items, snapshot.day_block.as_ref());
    Ok(Json(AvailabilityResponse {
        date,
        weekday: weekday_name(date.weekday()).to_string(),
        slots,
    }))
}

async fn update_appointment<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let date = request.date.as_deref().map(parse_date).transpose()?;
    if let Some(time) = request.time.as_deref() {
        parse_time(time)?;
    }
    let updated = state.store.update(
        id,
        AppointmentUpdate {
            client_name: request.name,
            phone: request.phone,
            service: request.service,
            date,
            time: request.time,
            status: request.status,
        },
    )?;
    Ok(Json(updated))
}

async fn delete_appointment<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError> {
    state.store.delete(id)?;
    Ok(Json(Ack { ok: true }))
}

#[derive(Debug, Deserialize)]
struct PurgeQuery {
    status: Option<String>,
}

async fn purge_appointments<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Query(query): Query<PurgeQuery>,
) -> Result<Json<PurgeResponse>, ApiError> {
    if query.status.as_deref() != Some("canceled") {
        return Err(StoreError::Validation(
            "Bulk removal requires ?status=canceled".into(),
        )
        .into());
    }
    let removed = state.store.delete_canceled()?;
    Ok(Json(PurgeResponse { ok: true, removed }))
}

async fn block_slot<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Json(request): Json<SlotRequest>,
) -> Result<(StatusCode, Json<Ack>), ApiError> {
    let date = parse_date(&request.date)?;
    parse_time(&request.time)?;
    state.store.block_slot(date, request.time)?;
    Ok((StatusCode::CREATED, Json(Ack { ok: true })))
}

async fn unblock_slot<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Json(request): Json<SlotRequest>,
) -> Result<Json<Ack>, ApiError> {
    let date = parse_date(&request.date)?;
    state.store.unblock_slot(date, request.time)?;
    Ok(Json(Ack { ok: true }))
}

async fn list_day_blocks<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> Json<DayBlocksResponse> {
    Json(DayBlocksResponse {
        items: state.store.day_blocks(),
    })
}

async fn block_day<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Json(request): Json<BlockDayRequest>,
) -> Result<(StatusCode, Json<DayBlock>), ApiError> {
    let date = parse_date(&request.date)?;
    let reason = request.reason.and_then(|r| {
        let r = r.trim().to_string();
        (!r.is_empty()).then_some(r)
    });
    let block = state.store.block_day(date, reason)?;
    Ok((StatusCode::CREATED, Json(block)))
}

async fn unblock_day<T: AppointmentBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Path(date): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    let date = parse_date(&date)?;
    state.store.unblock_day(date)?;
    Ok(Json(Ack { ok: true }))
}
