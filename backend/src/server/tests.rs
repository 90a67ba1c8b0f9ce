//! Tests for server bootstrap, covering readiness signalling and the headers
//! every response carries.

use super::*;
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::{fixture, rstest};
use std::net::SocketAddr;

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

#[fixture]
fn config() -> ServerConfig {
    ServerConfig::new(SocketAddr::from(([127, 0, 0, 1], 0)))
}

#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready(health_state: web::Data<HealthState>, config: ServerConfig) {
    assert!(!health_state.is_ready(), "state should start unready");

    let _server = create_server(health_state.clone(), config).expect("server should build");

    assert!(
        health_state.is_ready(),
        "server creation should mark readiness"
    );
}

#[rstest]
#[actix_web::test]
async fn responses_carry_common_and_trace_headers(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) {
    let app = actix_test::init_service(build_app(health_state, build_http_state(&config))).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/feedback/404")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let headers = response.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(
        headers
            .get(header::X_CONTENT_TYPE_OPTIONS)
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
    assert!(headers.contains_key(crate::domain::TRACE_ID_HEADER));
}

#[rstest]
#[actix_web::test]
async fn health_probes_are_mounted_at_the_root(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) {
    health_state.mark_ready();
    let app = actix_test::init_service(build_app(health_state, build_http_state(&config))).await;

    for uri in ["/health/ready", "/health/live"] {
        let request = actix_test::TestRequest::get().uri(uri).to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}
