use utoipa::OpenApi;

/// App-level document: title, servers and shared schemas
#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::HealthResponse)
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "API for managing products, categories, tags and reviews"
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
struct BaseDoc;

/// Full OpenAPI document served by the docs viewers
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        BaseDoc::openapi().merge_from(domain_catalog::ApiDoc::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_catalog_paths() {
        let doc = ApiDoc::openapi();

        assert_eq!(doc.info.title, "Catalog API");
        for path in ["/products", "/products/{id}", "/reviews/report", "/categories", "/tags/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
