use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::Json,
    Extension,
};
use chrono::NaiveDate;
use fieldtrack_core::{Event, EventId};
use serde::Deserialize;

use super::{error, with_service, ApiError};
use crate::middleware::AuthStaff;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AmendFollowupRequest {
    pub feedback: String,
    #[serde(default)]
    pub next_followup_date: Option<NaiveDate>,
}

/// Records feedback on one of the caller's visits. Other staff members' records read as 404.
pub async fn amend_followup(
    State(state): State<AppState>,
    Extension(staff): Extension<AuthStaff>,
    event_id: Result<Path<EventId>, PathRejection>,
    payload: Result<Json<AmendFollowupRequest>, JsonRejection>,
) -> Result<Json<Event>, ApiError> {
    let Path(event_id) = event_id.map_err(error::path_rejection)?;
    let Json(payload) = payload.map_err(error::json_rejection)?;
    let event = with_service(&state, move |service| {
        service.amend_followup(&staff.staff_id, event_id, &payload.feedback, payload.next_followup_date)
    })
    .await?;
    Ok(Json(event))
}
