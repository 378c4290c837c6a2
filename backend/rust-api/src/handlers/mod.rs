pub mod actions;
pub mod error;
pub mod followups;
pub mod reports;

pub use actions::{end_shift, start_shift, start_visit, FixRequest, VisitRequest};
pub use error::ApiError;
pub use followups::{amend_followup, AmendFollowupRequest};
pub use reports::{
    all_events, fleet_summary, my_followups, my_history, my_summary, my_track, pending_staff,
    AdminQuery, FleetSummaryResponse, FollowupStatusResponse, PendingStaffResponse,
};

use crate::AppState;
use fieldtrack_core::FieldService;

/// Runs a store-bound call off the async runtime; SQLite access is blocking.
pub(crate) async fn with_service<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&FieldService) -> fieldtrack_core::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| {
            tracing::error!("Blocking task failed: {:?}", e);
            error::internal()
        })?
        .map_err(error::from_core)
}
