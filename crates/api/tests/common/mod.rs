#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tesis_api::auth::jwt::{generate_access_token, JwtConfig};
use tesis_api::config::ServerConfig;
use tesis_api::router::build_app_router;
use tesis_api::state::AppState;
use tesis_core::defense::{DefenseKind, DefenseStatus};
use tesis_core::proposal::ProposalStatus;
use tesis_core::roles::EvaluatorRole;
use tesis_core::store::{InMemoryDefenseStore, NewProposal};
use tesis_core::types::DbId;
use tesis_core::workflow::DefenseWorkflow;
use tesis_events::EventBus;

pub const JURY_1: DbId = 101;
pub const JURY_2: DbId = 102;
pub const TUTOR: DbId = 201;
pub const DIRECTOR: DbId = 301;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        store_timeout_secs: 5,
        database_max_connections: 1,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The application under test plus handles on its in-memory store and
/// event bus.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryDefenseStore>,
    pub event_bus: Arc<EventBus>,
    pub config: ServerConfig,
}

/// Build the full application router over a fresh in-memory store, using
/// the same middleware stack as production.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(InMemoryDefenseStore::new());
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        workflow: Arc::new(DefenseWorkflow::new(store.clone())),
        pool: None,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        event_bus,
        config,
    }
}

impl TestApp {
    /// Mint a Bearer token for `evaluator_id` with `role`.
    pub fn token(&self, evaluator_id: DbId, role: &str) -> String {
        generate_access_token(evaluator_id, role, &self.config.jwt).unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }
}

/// Parse a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Ids of the seeded proposal and its two defenses.
pub struct Seeded {
    pub proposal_id: DbId,
    pub private_id: DbId,
    pub public_id: DbId,
}

/// One approved proposal with a scheduled private defense (JURY_1, JURY_2,
/// TUTOR and DIRECTOR rostered) and a pending public defense.
pub async fn seed(store: &InMemoryDefenseStore) -> Seeded {
    let proposal = store
        .insert_proposal(NewProposal {
            student_id: 1,
            title: "Plataforma de seguimiento de tesis".into(),
            career: "Ingeniería de Software".into(),
            status: ProposalStatus::Aprobada,
        })
        .await;
    let private = store
        .insert_defense(proposal.id, DefenseKind::Privada, DefenseStatus::Programada)
        .await
        .unwrap();
    let public = store
        .insert_defense(proposal.id, DefenseKind::Publica, DefenseStatus::Pendiente)
        .await
        .unwrap();

    for (id, role) in [
        (JURY_1, EvaluatorRole::Jurado),
        (JURY_2, EvaluatorRole::Jurado),
        (TUTOR, EvaluatorRole::Tutor),
        (DIRECTOR, EvaluatorRole::Director),
    ] {
        store.assign_participant(private.id, id, role).await.unwrap();
    }

    Seeded {
        proposal_id: proposal.id,
        private_id: private.id,
        public_id: public.id,
    }
}
