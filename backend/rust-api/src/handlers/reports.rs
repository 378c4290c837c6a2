use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    Extension,
};
use chrono::NaiveDate;
use fieldtrack_core::{summary, DateWindow, DayStatus, Event, StaffId, StaffSummary, TrackPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{error, with_service, ApiError};
use crate::middleware::AuthStaff;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub staff_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl AdminQuery {
    /// Blank `staff_id` means all staff, like the unfiltered admin view.
    fn staff_filter(&self) -> Result<Option<StaffId>, ApiError> {
        match self.staff_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => StaffId::parse(raw).map(Some).map_err(error::from_core),
        }
    }

    fn window(&self) -> DateWindow {
        DateWindow { from: self.from, to: self.to }
    }
}

#[derive(Debug, Serialize)]
pub struct FollowupStatusResponse {
    pub date: NaiveDate,
    pub status: DayStatus,
}

#[derive(Debug, Serialize)]
pub struct FleetSummaryResponse {
    pub staff: BTreeMap<StaffId, StaffSummary>,
    pub totals: StaffSummary,
}

#[derive(Debug, Serialize)]
pub struct PendingStaffResponse {
    pub date: NaiveDate,
    pub staff: Vec<StaffId>,
}

pub async fn my_history(
    State(state): State<AppState>,
    Extension(staff): Extension<AuthStaff>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = with_service(&state, move |service| service.history(&staff.staff_id)).await?;
    Ok(Json(events))
}

pub async fn my_summary(
    State(state): State<AppState>,
    Extension(staff): Extension<AuthStaff>,
    window: Result<Query<DateWindow>, QueryRejection>,
) -> Result<Json<StaffSummary>, ApiError> {
    let Query(window) = window.map_err(error::query_rejection)?;
    let summary = with_service(&state, move |service| service.summary_for(&staff.staff_id, window)).await?;
    Ok(Json(summary))
}

pub async fn my_followups(
    State(state): State<AppState>,
    Extension(staff): Extension<AuthStaff>,
) -> Result<Json<FollowupStatusResponse>, ApiError> {
    let response = with_service(&state, move |service| {
        Ok(FollowupStatusResponse {
            date: service.today(),
            status: service.followup_status(&staff.staff_id)?,
        })
    })
    .await?;
    Ok(Json(response))
}

pub async fn my_track(
    State(state): State<AppState>,
    Extension(staff): Extension<AuthStaff>,
) -> Result<Json<Vec<TrackPoint>>, ApiError> {
    let track = with_service(&state, move |service| service.track_for(&staff.staff_id)).await?;
    Ok(Json(track))
}

pub async fn fleet_summary(
    State(state): State<AppState>,
    query: Result<Query<AdminQuery>, QueryRejection>,
) -> Result<Json<FleetSummaryResponse>, ApiError> {
    let Query(query) = query.map_err(error::query_rejection)?;
    let filter = query.staff_filter()?;
    let window = query.window();
    let staff = with_service(&state, move |service| {
        let mut fleet = service.fleet_summary(window)?;
        if let Some(staff_id) = filter {
            fleet.retain(|id, _| *id == staff_id);
        }
        Ok(fleet)
    })
    .await?;
    let totals = summary::fleet_totals(&staff);
    Ok(Json(FleetSummaryResponse { staff, totals }))
}

pub async fn all_events(
    State(state): State<AppState>,
    query: Result<Query<AdminQuery>, QueryRejection>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let Query(query) = query.map_err(error::query_rejection)?;
    let filter = query.staff_filter()?;
    let window = query.window();
    let events = with_service(&state, move |service| {
        let mut events = service.all_events(filter.as_ref())?;
        events.retain(|e| window.contains(e.timestamp));
        Ok(events)
    })
    .await?;
    Ok(Json(events))
}

pub async fn pending_staff(State(state): State<AppState>) -> Result<Json<PendingStaffResponse>, ApiError> {
    let response = with_service(&state, |service| {
        Ok(PendingStaffResponse {
            date: service.today(),
            staff: service.pending_staff_today()?.into_iter().collect(),
        })
    })
    .await?;
    Ok(Json(response))
}
