//! Health probes for orchestrators.
//!
//! The service moves through three phases: starting, serving and draining.
//! Readiness passes only while serving; liveness fails once draining begins.

use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

/// Lifecycle phase reported by both probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Store not prepared or listener not bound yet.
    Starting,
    /// Accepting feedback and votes.
    Serving,
    /// Shutting down; in-flight requests finish, new ones should go elsewhere.
    Draining,
}

impl Phase {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Serving => 1,
            Self::Draining => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Starting,
            1 => Self::Serving,
            _ => Self::Draining,
        }
    }
}

/// Body of a probe response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeReport {
    pub phase: Phase,
}

/// Shared lifecycle phase read by the probe handlers.
#[derive(Debug)]
pub struct HealthState {
    phase: AtomicU8,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            phase: AtomicU8::new(Phase::Starting.as_u8()),
        }
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Enter the serving phase. A draining service stays draining.
    pub fn mark_ready(&self) {
        // A failed exchange means draining already started.
        let _ = self.phase.compare_exchange(
            Phase::Starting.as_u8(),
            Phase::Serving.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Enter the draining phase; both probes fail from now on.
    pub fn mark_draining(&self) {
        self.phase.store(Phase::Draining.as_u8(), Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == Phase::Serving
    }

    pub fn is_alive(&self) -> bool {
        self.phase() != Phase::Draining
    }

    fn report(&self, probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(ProbeReport {
                phase: self.phase(),
            })
    }
}

/// Readiness probe: 200 while serving.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Accepting feedback", body = ProbeReport),
        (status = 503, description = "Starting or draining", body = ProbeReport)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    state.report(state.is_ready())
}

/// Liveness probe: 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Process is alive", body = ProbeReport),
        (status = 503, description = "Draining", body = ProbeReport)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    state.report(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    async fn call(state: web::Data<HealthState>, uri: &str) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .service(ready)
                .service(live),
        )
        .await;
        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await;
        let status = response.status();
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        (status, actix_test::read_body_json(response).await)
    }

    #[rstest]
    #[case::starting(Phase::Starting, "/health/ready", StatusCode::SERVICE_UNAVAILABLE, "starting")]
    #[case::starting_live(Phase::Starting, "/health/live", StatusCode::OK, "starting")]
    #[case::serving(Phase::Serving, "/health/ready", StatusCode::OK, "serving")]
    #[case::serving_live(Phase::Serving, "/health/live", StatusCode::OK, "serving")]
    #[case::draining(Phase::Draining, "/health/ready", StatusCode::SERVICE_UNAVAILABLE, "draining")]
    #[case::draining_live(Phase::Draining, "/health/live", StatusCode::SERVICE_UNAVAILABLE, "draining")]
    #[actix_web::test]
    async fn probes_follow_the_phase(
        #[case] phase: Phase,
        #[case] uri: &str,
        #[case] expected: StatusCode,
        #[case] reported: &str,
    ) {
        let state = web::Data::new(HealthState::new());
        match phase {
            Phase::Starting => {}
            Phase::Serving => state.mark_ready(),
            Phase::Draining => {
                state.mark_ready();
                state.mark_draining();
            }
        }

        let (status, body) = call(state, uri).await;

        assert_eq!(status, expected);
        assert_eq!(body["phase"], reported);
    }

    #[rstest]
    fn draining_is_not_undone_by_a_late_ready() {
        let state = HealthState::new();
        state.mark_draining();
        state.mark_ready();
        assert_eq!(state.phase(), Phase::Draining);
        assert!(!state.is_ready());
    }
}
