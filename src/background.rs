use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;
use crate::error::AppError;
use crate::state::AppState;

/// Runs the CRM sync sweep on a fixed interval, the same sweep the cron
/// endpoint triggers. SYNC_INTERVAL_SECS=0 disables the worker.
pub async fn start_background_worker(state: Arc<AppState>) {
    let interval = state.config.sync_interval_secs;
    if interval == 0 {
        info!("Background sync worker disabled (SYNC_INTERVAL_SECS=0)");
        return;
    }

    info!("Starting background sync worker (every {}s)...", interval);

    loop {
        sleep(Duration::from_secs(interval)).await;

        let sweep_id = Uuid::new_v4().to_string();
        let span = info_span!("sync_sweep", sweep_id = %sweep_id);

        async {
            match state.sync_service.run_sweep().await {
                Ok(report) => {
                    info!(
                        scanned = report.scanned,
                        synced = report.synced,
                        failed = report.failed,
                        skipped = report.skipped,
                        skipped_past = report.skipped_past,
                        "Sweep finished"
                    );
                }
                Err(AppError::CrmNotConfigured(_)) => {
                    debug!("Sweep skipped: GHL credentials not configured");
                }
                Err(e) => error!("Sweep failed: {}", e),
            }
        }
        .instrument(span)
        .await;
    }
}
