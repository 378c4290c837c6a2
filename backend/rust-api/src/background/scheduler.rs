use fieldtrack_core::{FieldService, StaffId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::Config;

pub struct BackgroundScheduler {
    #[allow(dead_code)]
    scheduler: Arc<JobScheduler>,
}

impl BackgroundScheduler {
    pub async fn new(service: FieldService, config: Arc<Config>) -> anyhow::Result<Self> {
        let scheduler = JobScheduler::new().await?;

        scheduler
            .add(Job::new_async(config.pending_report_cron.as_str(), move |_uuid, _l| {
                let service = service.clone();
                Box::pin(async move {
                    report_pending_followups(service).await;
                })
            })?)
            .await?;

        scheduler.start().await?;
        info!("Background scheduler started (pending follow-up report: {})", config.pending_report_cron);

        Ok(Self { scheduler: Arc::new(scheduler) })
    }

    pub async fn shutdown(&self) {
        // The scheduler stops when dropped.
        info!("Background scheduler stopped");
    }
}

/// Logs every staff member who still owes feedback on a follow-up due today.
/// Returns who was reported; a failed lookup is logged and reports nobody.
pub async fn report_pending_followups(service: FieldService) -> BTreeSet<StaffId> {
    let today = service.today();
    match tokio::task::spawn_blocking(move || service.pending_staff_today()).await {
        Ok(Ok(pending)) if pending.is_empty() => {
            info!("Pending follow-up report for {}: none", today);
            pending
        }
        Ok(Ok(pending)) => {
            let staff: Vec<&str> = pending.iter().map(|s| s.as_str()).collect();
            warn!("Pending follow-up report for {}: {} staff ({})", today, staff.len(), staff.join(", "));
            pending
        }
        Ok(Err(e)) => {
            error!("Pending follow-up report failed: {}", e);
            BTreeSet::new()
        }
        Err(e) => {
            error!("Pending follow-up report task failed: {:?}", e);
            BTreeSet::new()
        }
    }
}
