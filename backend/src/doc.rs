//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the domain schemas they exchange. The document is served by Swagger
//! UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, ErrorEntry, Feedback, FeedbackId};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Course feedback API",
        description = "Anonymous course feedback with bounded agreement votes.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::feedback::list_feedback,
        crate::inbound::http::feedback::create_feedback,
        crate::inbound::http::feedback::get_feedback,
        crate::inbound::http::feedback::update_feedback,
        crate::inbound::http::feedback::delete_feedback,
        crate::inbound::http::feedback::adjust_upvotes,
        crate::inbound::http::feedback::adjust_downvotes,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Feedback,
        FeedbackId,
        Error,
        ErrorEntry,
        ErrorCode,
        crate::inbound::http::health::Phase,
        crate::inbound::http::health::ProbeReport
    )),
    tags(
        (name = "feedback", description = "Feedback records and votes"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn feedback_schema_uses_wire_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let feedback = schemas.get("Feedback").expect("Feedback schema");

        for field in ["id", "course", "feedback", "upvotes", "downvotes"] {
            assert_object_schema_has_field(feedback, field);
        }
    }

    #[test]
    fn error_schema_lists_entries() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error, "code");
        assert_object_schema_has_field(error, "errors");
        assert_object_schema_has_field(error, "traceId");
    }

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/v1/feedback",
            "/api/v1/feedback/{id}",
            "/api/v1/feedback/{id}/upvotes",
            "/api/v1/feedback/{id}/downvotes",
            "/health/ready",
            "/health/live",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
