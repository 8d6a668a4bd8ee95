use crate::errors::ErrorBody;
use utoipa::OpenApi;

/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hacker House API",
        description = "Talent Protocol identity lookup proxy for the hacker house front end"
    ),
    paths(crate::handlers::health, crate::handlers::talent_protocol_lookup),
    components(schemas(ErrorBody)),
    tags(
        (name = "talent-protocol", description = "Identity, builder score and credentials lookups"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_lookup_route() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/talent-protocol"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
