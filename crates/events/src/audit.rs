//! Structured audit trail of defense events.
//!
//! [`AuditLog`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! writes one `tracing` record per event. It runs as a long-lived
//! background task and stops when the bus is dropped.

use tokio::sync::broadcast;

use crate::bus::DefenseEvent;

pub struct AuditLog;

impl AuditLog {
    /// Run the audit loop until the channel closes. Returns the number of
    /// events logged.
    pub async fn run(mut receiver: broadcast::Receiver<DefenseEvent>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    Self::record(&event);
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Audit log lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, audit log shutting down");
                    break;
                }
            }
        }
        logged
    }

    fn record(event: &DefenseEvent) {
        tracing::info!(
            target: "tesis_audit",
            event_type = %event.event_type,
            defense_id = event.defense_id,
            actor_id = event.actor_id,
            payload = %event.payload,
            at = %event.timestamp,
            "Defense event"
        );
    }
}
