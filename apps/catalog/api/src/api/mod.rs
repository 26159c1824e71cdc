use axum::Router;
use domain_catalog::{CatalogService, PgCatalogRepository};

pub mod health;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix is added by the `create_router` helper.
///
/// Returns a stateless Router; the catalog router applies its own state.
pub fn routes(state: &crate::state::AppState) -> Router {
    let repository = PgCatalogRepository::new(state.db.clone());
    let service = CatalogService::new(repository, state.config.pagination.page_size);

    domain_catalog::handlers::router(service)
}

/// Router with the `/ready` endpoint, merged next to the stateless app router.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{app_info, pagination::PaginationConfig, server::ServerConfig};
    use database::postgres::{DatabaseConnection, PostgresConfig};
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, Value};
    use serde_json::json;
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    fn state(db: DatabaseConnection) -> AppState {
        AppState {
            config: Config {
                app: app_info!(),
                database: PostgresConfig::new("postgres://localhost/catalog"),
                server: ServerConfig::default(),
                pagination: PaginationConfig::default(),
                environment: Environment::Development,
            },
            db,
        }
    }

    async fn get_ready(db: DatabaseConnection) -> (StatusCode, serde_json::Value) {
        let response = ready_router(state(db))
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ready_when_database_answers() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "?column?",
                Value::Int(Some(1)),
            )])]])
            .into_connection();

        let (status, body) = get_ready(db).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ready", "database": "connected"}));
    }

    #[tokio::test]
    async fn test_not_ready_when_database_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection refused".into())])
            .into_connection();

        let (status, body) = get_ready(db).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not ready");
        assert_eq!(body["database"], "disconnected");
    }
}
