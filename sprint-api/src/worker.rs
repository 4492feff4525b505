use sprint_core::repository::BookingRepository;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Periodically cancel LOCKED bookings whose TTL elapsed, releasing
/// their slots. Capacity counts are TTL-aware on their own; this sweep
/// only makes the CANCELLED state explicit for readers.
pub async fn start_lock_expiry_worker(
    bookings: Arc<dyn BookingRepository>,
    interval_seconds: u64,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds.max(1)));

    info!("Lock expiry worker started");

    loop {
        ticker.tick().await;

        match bookings.cancel_expired_locks().await {
            Ok(0) => {}
            Ok(released) => info!("Released {} expired slot locks", released),
            Err(e) => error!("Failed to sweep expired locks: {}", e),
        }
    }
}
