//! Feedback HTTP handlers.
//!
//! ```text
//! GET     /api/v1/feedback
//! POST    /api/v1/feedback
//! GET     /api/v1/feedback/{id}
//! PUT     /api/v1/feedback/{id}
//! DELETE  /api/v1/feedback/{id}
//! PATCH   /api/v1/feedback/{id}/upvotes
//! PATCH   /api/v1/feedback/{id}/downvotes
//! ```
//!
//! Vote endpoints take a bare JSON integer, `1` or `-1`. Request bodies or
//! path ids that fail to parse are reported with a single "could not parse"
//! entry instead of the extractor's own message.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, delete, get, options, patch, post, put, web};

use crate::domain::{Error, Feedback, FeedbackId, VoteCounter};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const COLLECTION_METHODS: &str = "GET, POST, OPTIONS";
const ENTRY_METHODS: &str = "GET, PUT, PATCH, DELETE, OPTIONS";

/// Error returned when a body or path parameter cannot be decoded.
pub fn feedback_bind_error(raw: impl Into<String>) -> Error {
    Error::invalid_request(
        "Could not parse your feedback",
        "The feedback you gave could not be parsed. This usually means that you did not respect the specification. Check your input and try again.",
    )
    .with_entry_debug(raw)
}

/// JSON extractor settings for the feedback scope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| feedback_bind_error(err.to_string()).into())
}

/// Path extractor settings for the feedback scope.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req: &HttpRequest| feedback_bind_error(err.to_string()).into())
}

fn preflight(methods: &'static str) -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, methods))
        .finish()
}

/// List every feedback record.
#[utoipa::path(
    get,
    path = "/api/v1/feedback",
    responses(
        (status = 200, description = "All feedback", body = [Feedback]),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["feedback"],
    operation_id = "listFeedback"
)]
#[get("/feedback")]
pub async fn list_feedback(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Feedback>>> {
    let records = state.feedback.list().await?;
    Ok(web::Json(records))
}

/// Submit new feedback.
///
/// Client-supplied ids and vote counts are ignored.
#[utoipa::path(
    post,
    path = "/api/v1/feedback",
    request_body = Feedback,
    responses(
        (status = 200, description = "Stored feedback", body = Feedback),
        (status = 400, description = "Invalid feedback", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["feedback"],
    operation_id = "createFeedback"
)]
#[post("/feedback")]
pub async fn create_feedback(
    state: web::Data<HttpState>,
    payload: web::Json<Feedback>,
) -> ApiResult<web::Json<Feedback>> {
    let stored = state.feedback.create(payload.into_inner()).await?;
    Ok(web::Json(stored))
}

/// Preflight for the collection.
#[options("/feedback")]
pub async fn feedback_collection_options() -> HttpResponse {
    preflight(COLLECTION_METHODS)
}

/// Fetch one feedback record.
#[utoipa::path(
    get,
    path = "/api/v1/feedback/{id}",
    params(("id" = u64, Path, description = "Feedback identifier")),
    responses(
        (status = 200, description = "Feedback", body = Feedback),
        (status = 400, description = "Unparsable id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["feedback"],
    operation_id = "getFeedback"
)]
#[get("/feedback/{id}")]
pub async fn get_feedback(
    state: web::Data<HttpState>,
    path: web::Path<u64>,
) -> ApiResult<web::Json<Feedback>> {
    let record = state.feedback.get(FeedbackId::new(path.into_inner())).await?;
    Ok(web::Json(record))
}

/// Replace a feedback record.
///
/// The id in the path wins over any id in the body.
#[utoipa::path(
    put,
    path = "/api/v1/feedback/{id}",
    params(("id" = u64, Path, description = "Feedback identifier")),
    request_body = Feedback,
    responses(
        (status = 200, description = "Updated feedback", body = Feedback),
        (status = 400, description = "Invalid feedback", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["feedback"],
    operation_id = "updateFeedback"
)]
#[put("/feedback/{id}")]
pub async fn update_feedback(
    state: web::Data<HttpState>,
    path: web::Path<u64>,
    payload: web::Json<Feedback>,
) -> ApiResult<web::Json<Feedback>> {
    let record = Feedback {
        id: FeedbackId::new(path.into_inner()),
        ..payload.into_inner()
    };
    let updated = state.feedback.update(record).await?;
    Ok(web::Json(updated))
}

/// Delete a feedback record.
///
/// The body must repeat every field of the stored record; a stale copy
/// deletes nothing and yields 404.
#[utoipa::path(
    delete,
    path = "/api/v1/feedback/{id}",
    params(("id" = u64, Path, description = "Feedback identifier")),
    request_body = Feedback,
    responses(
        (status = 200, description = "Deleted feedback, with a blank id", body = Feedback),
        (status = 400, description = "Invalid feedback", body = Error),
        (status = 404, description = "No matching record", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["feedback"],
    operation_id = "deleteFeedback"
)]
#[delete("/feedback/{id}")]
pub async fn delete_feedback(
    state: web::Data<HttpState>,
    path: web::Path<u64>,
    payload: web::Json<Feedback>,
) -> ApiResult<web::Json<Feedback>> {
    let record = Feedback {
        id: FeedbackId::new(path.into_inner()),
        ..payload.into_inner()
    };
    let removed = state.feedback.delete(record).await?;
    Ok(web::Json(removed))
}

async fn adjust(
    state: &HttpState,
    id: u64,
    counter: VoteCounter,
    delta: i64,
) -> ApiResult<web::Json<Feedback>> {
    let updated = state
        .feedback
        .adjust_votes(FeedbackId::new(id), counter, delta)
        .await?;
    Ok(web::Json(updated))
}

/// Add (`1`) or retract (`-1`) an agreement vote.
#[utoipa::path(
    patch,
    path = "/api/v1/feedback/{id}/upvotes",
    params(("id" = u64, Path, description = "Feedback identifier")),
    request_body(content = i64, description = "Vote delta, 1 or -1"),
    responses(
        (status = 200, description = "Updated feedback", body = Feedback),
        (status = 400, description = "Delta other than 1 or -1", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Counter at its bound", body = Error),
        (status = 503, description = "Vote timed out", body = Error)
    ),
    tags = ["feedback"],
    operation_id = "adjustUpvotes"
)]
#[patch("/feedback/{id}/upvotes")]
pub async fn adjust_upvotes(
    state: web::Data<HttpState>,
    path: web::Path<u64>,
    delta: web::Json<i64>,
) -> ApiResult<web::Json<Feedback>> {
    adjust(
        &state,
        path.into_inner(),
        VoteCounter::Upvotes,
        delta.into_inner(),
    )
    .await
}

/// Add (`1`) or retract (`-1`) a disagreement vote.
#[utoipa::path(
    patch,
    path = "/api/v1/feedback/{id}/downvotes",
    params(("id" = u64, Path, description = "Feedback identifier")),
    request_body(content = i64, description = "Vote delta, 1 or -1"),
    responses(
        (status = 200, description = "Updated feedback", body = Feedback),
        (status = 400, description = "Delta other than 1 or -1", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Counter at its bound", body = Error),
        (status = 503, description = "Vote timed out", body = Error)
    ),
    tags = ["feedback"],
    operation_id = "adjustDownvotes"
)]
#[patch("/feedback/{id}/downvotes")]
pub async fn adjust_downvotes(
    state: web::Data<HttpState>,
    path: web::Path<u64>,
    delta: web::Json<i64>,
) -> ApiResult<web::Json<Feedback>> {
    adjust(
        &state,
        path.into_inner(),
        VoteCounter::Downvotes,
        delta.into_inner(),
    )
    .await
}

/// Preflight for a single record and its vote counters.
#[options("/feedback/{tail:.*}")]
pub async fn feedback_entry_options() -> HttpResponse {
    preflight(ENTRY_METHODS)
}

/// Register every feedback route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(list_feedback)
        .service(create_feedback)
        .service(feedback_collection_options)
        .service(get_feedback)
        .service(update_feedback)
        .service(delete_feedback)
        .service(adjust_upvotes)
        .service(adjust_downvotes)
        .service(feedback_entry_options);
}
