//! # Axum Helpers
//!
//! Shared plumbing for the HTTP services in this workspace.
//!
//! - **[`server`]**: router assembly with OpenAPI viewers, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: [`AppError`] and the JSON error body every endpoint returns
//! - **[`extractors`]**: [`IdPath`] and [`ValidatedJson`]
//!
//! ```ignore
//! use axum_helpers::server::{close_postgres, create_production_app, create_router};
//! use core_config::server::ServerConfig;
//!
//! let config = ServerConfig::default().with_cors_origins(["http://localhost:3000"]);
//! let router = create_router::<ApiDoc>(api_routes, &config)?;
//! create_production_app(router, &config, Duration::from_secs(30), close_postgres(db, "catalog")).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, close_postgres, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{IdPath, ValidatedJson};
