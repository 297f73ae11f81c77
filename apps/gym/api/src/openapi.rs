use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Gym API",
        version = "0.1.0",
        description = "Students, plans, enrollments and the student help desk"
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
struct BaseDoc;

/// Combined document. Domain handlers declare full paths (`/students`,
/// `/enrollments/{id}`), so the domain docs are merged rather than nested.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = BaseDoc::openapi();
        doc.merge(domain_students::handlers::ApiDoc::openapi());
        doc.merge(domain_plans::handlers::ApiDoc::openapi());
        doc.merge(domain_enrollments::handlers::ApiDoc::openapi());
        doc.merge(domain_help_orders::handlers::ApiDoc::openapi());
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_domain_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/students",
            "/students/{id}",
            "/students/{id}/help-orders",
            "/plans",
            "/plans/{id}",
            "/enrollments",
            "/enrollments/{id}",
            "/help-orders",
            "/help-orders/{id}/answer",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert_eq!(doc.info.title, "Gym API");
    }
}
