mod common;

use axum::http::StatusCode;

use common::build_test_app;

#[tokio::test]
async fn health_reports_in_memory_store() {
    let app = build_test_app();
    let (status, json) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "memory");
    assert_eq!(json["store_healthy"], true);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = build_test_app();
    let response = {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        app.router
            .clone()
            .oneshot(Request::builder().uri("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap()
    };
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
