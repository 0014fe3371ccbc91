use cart_engine::SessionCartStore;
use chrono::Duration;
use log::*;
use tokio::task::JoinHandle;

/// Starts the idle session eviction worker. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_session_expiry_worker(sessions: SessionCartStore, idle_timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(60));
        info!("🕰️ Idle session expiry worker started. Sessions expire after {} min.", idle_timeout.num_minutes());
        loop {
            timer.tick().await;
            let evicted = sessions.evict_idle(idle_timeout).await;
            if evicted > 0 {
                info!("🕰️ {evicted} idle session(s) expired. {} remain.", sessions.session_count().await);
            } else {
                trace!("🕰️ No idle sessions to expire");
            }
        }
    })
}
