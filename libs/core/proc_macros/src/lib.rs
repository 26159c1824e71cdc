// Re-export proc macros when their features are enabled
#[cfg(feature = "sea_orm_resource")]
pub use sea_orm_resource::SeaOrmResource;

/// REST resource metadata for a persisted entity.
///
/// Derived with `SeaOrmResource`. Handlers use the URL constants for
/// routing, OpenAPI uses `TAG`, and error messages use `RESOURCE`.
///
/// # Examples
///
/// ```ignore
/// use core_proc_macros::{ApiResource, SeaOrmResource};
///
/// #[derive(DeriveEntityModel, SeaOrmResource)]
/// #[sea_orm(table_name = "categories")]
/// pub struct Model { /* ... */ }
///
/// assert_eq!(Model::URL, "/categories");
/// assert_eq!(Model::URL_WITH_ID, "/categories/{id}");
/// assert_eq!(Model::RESOURCE, "Category");
/// ```
pub trait ApiResource {
    /// Collection path relative to the API root (e.g. "/tags")
    const URL: &'static str;
    /// Item path with an `{id}` segment (e.g. "/tags/{id}")
    const URL_WITH_ID: &'static str;
    /// Backing table name (e.g. "tags")
    const COLLECTION: &'static str;
    /// OpenAPI tag (e.g. "Tags")
    const TAG: &'static str;
    /// Singular display name used in messages (e.g. "Tag")
    const RESOURCE: &'static str;
}
