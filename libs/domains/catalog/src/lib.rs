//! Catalog Domain
//!
//! Products, categories, tags and reviews behind one REST surface.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, payload validation, status codes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Reference checks, delete policy, pagination
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory and Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, request schemas, response models
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     handlers,
//!     repository::InMemoryCatalogRepository,
//!     service::CatalogService,
//! };
//!
//! let repository = InMemoryCatalogRepository::new();
//! let service = CatalogService::new(repository, 10);
//!
//! // Routes are absolute (`/products`, `/tags/{id}`, ...); nest under `/api`
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod postgres;
pub mod repository;
pub mod service;

pub use core_proc_macros::ApiResource;
pub use error::{CatalogError, CatalogResult};
pub use handlers::ApiDoc;
pub use models::{
    AverageStars, Category, CategoryFields, CategoryListing, CategoryPayload, Product,
    ProductCount, ProductFields, ProductPayload, Review, ReviewFields, ReviewPayload,
    ReviewReport, Tag, TagFields, TagPayload,
};
pub use pagination::{Page, PageNumber, PageQuery, PageWindow, Paginated};
pub use postgres::PgCatalogRepository;
pub use repository::{CatalogRepository, InMemoryCatalogRepository};
pub use service::CatalogService;
