use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use fieldtrack_core::{Coordinates, Event, VisitDetails};
use serde::Deserialize;

use super::{error, with_service, ApiError};
use crate::middleware::AuthStaff;
use crate::AppState;

/// Location reported with an action. Both halves or neither.
#[derive(Debug, Default, Deserialize)]
pub struct FixRequest {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl FixRequest {
    fn coordinates(&self) -> Result<Option<Coordinates>, ApiError> {
        Coordinates::from_parts(self.lat, self.lon).map_err(error::from_core)
    }
}

#[derive(Debug, Deserialize)]
pub struct VisitRequest {
    #[serde(flatten)]
    pub fix: FixRequest,
    #[serde(flatten)]
    pub details: VisitDetails,
}

pub async fn start_shift(
    State(state): State<AppState>,
    Extension(staff): Extension<AuthStaff>,
    payload: Result<Json<FixRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let Json(payload) = payload.map_err(error::json_rejection)?;
    let fix = payload.coordinates()?;
    let event = with_service(&state, move |service| service.start_shift(&staff.staff_id, fix)).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn start_visit(
    State(state): State<AppState>,
    Extension(staff): Extension<AuthStaff>,
    payload: Result<Json<VisitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let Json(payload) = payload.map_err(error::json_rejection)?;
    let fix = payload.fix.coordinates()?;
    let details = payload.details;
    let event =
        with_service(&state, move |service| service.start_visit(&staff.staff_id, fix, details)).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn end_shift(
    State(state): State<AppState>,
    Extension(staff): Extension<AuthStaff>,
    payload: Result<Json<FixRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let Json(payload) = payload.map_err(error::json_rejection)?;
    let fix = payload.coordinates()?;
    let event = with_service(&state, move |service| service.end_shift(&staff.staff_id, fix)).await?;
    Ok((StatusCode::CREATED, Json(event)))
}
