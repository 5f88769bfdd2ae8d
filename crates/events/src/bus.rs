//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.
//! Publishing happens after the store write commits; a dropped event never
//! affects the write it describes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tesis_core::defense::{FinalizationRecord, ParticipantEvaluation};
use tesis_core::types::DbId;
use tokio::sync::broadcast;

pub const EVENT_DEFENSE_GRADED: &str = "defense.graded";
pub const EVENT_DEFENSE_FINALIZED: &str = "defense.finalized";

// ---------------------------------------------------------------------------
// DefenseEvent
// ---------------------------------------------------------------------------

/// Something that happened to a defense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefenseEvent {
    /// Dot-separated event name, e.g. `"defense.graded"`.
    pub event_type: String,

    pub defense_id: DbId,

    /// The evaluator or finalizer that caused the event.
    pub actor_id: DbId,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl DefenseEvent {
    pub fn new(event_type: impl Into<String>, defense_id: DbId, actor_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            defense_id,
            actor_id,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// A grade was recorded or replaced.
    pub fn graded(evaluation: &ParticipantEvaluation) -> Self {
        Self::new(
            EVENT_DEFENSE_GRADED,
            evaluation.defense_id,
            evaluation.evaluator_id,
        )
        .with_payload(serde_json::json!({
            "evaluation_id": evaluation.id,
            "evaluator_role": evaluation.evaluator_role,
            "grade": evaluation.grade,
        }))
    }

    /// A defense reached its terminal status.
    pub fn finalized(record: &FinalizationRecord) -> Self {
        Self::new(EVENT_DEFENSE_FINALIZED, record.defense_id, record.finalized_by).with_payload(
            serde_json::json!({
                "finalization_id": record.id,
                "finalizer_role": record.finalizer_role,
                "final_status": record.final_status,
            }),
        )
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<DefenseEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Without subscribers the
    /// event is dropped.
    pub fn publish(&self, event: DefenseEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DefenseEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tesis_core::defense::DefenseStatus;
    use tesis_core::roles::EvaluatorRole;

    use super::*;

    fn evaluation() -> ParticipantEvaluation {
        ParticipantEvaluation {
            id: 9,
            defense_id: 4,
            evaluator_id: 101,
            evaluator_role: EvaluatorRole::Jurado,
            grade: 8.5,
            comment: "Buen trabajo".into(),
            graded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(DefenseEvent::graded(&evaluation()));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, EVENT_DEFENSE_GRADED);
        assert_eq!(received.defense_id, 4);
        assert_eq!(received.actor_id, 101);
        assert_eq!(received.payload["grade"], 8.5);
        assert_eq!(received.payload["evaluator_role"], "JURADO");
    }

    #[tokio::test]
    async fn every_subscriber_receives_the_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let record = FinalizationRecord {
            id: 2,
            defense_id: 4,
            finalized_by: 301,
            finalizer_role: EvaluatorRole::Director,
            final_status: DefenseStatus::Aprobada,
            comments: "Aprobado por unanimidad".into(),
            finalized_at: Utc::now(),
        };
        bus.publish(DefenseEvent::finalized(&record));

        for rx in [&mut rx1, &mut rx2] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.event_type, EVENT_DEFENSE_FINALIZED);
            assert_eq!(event.payload["final_status"], "APROBADA");
        }
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.publish(DefenseEvent::new("defense.graded", 1, 1));
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for id in 0..5 {
            bus.publish(DefenseEvent::new(EVENT_DEFENSE_GRADED, id, 1));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }
}
