use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use std::borrow::Cow;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

pub const INVALID_PAGE: &str = "Invalid page.";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{resource} with id {id} not found")]
    NotFound { resource: &'static str, id: i32 },

    /// A payload points at a row that does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(ValidationErrors),

    #[error("Invalid page.")]
    InvalidPage,

    #[error("Category {id} still has {products} product(s)")]
    CategoryInUse { id: i32, products: u64 },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(resource: &'static str, id: i32) -> Self {
        Self::NotFound { resource, id }
    }

    /// One `does_not_exist` field error per id, keyed like a validation failure.
    pub fn missing_reference(field: &'static str, ids: &[i32]) -> Self {
        let mut errors = ValidationErrors::new();
        for id in ids {
            let mut error = ValidationError::new("does_not_exist").with_message(Cow::Owned(
                format!("Invalid pk \"{}\" - object does not exist.", id),
            ));
            error.add_param(Cow::Borrowed("value"), id);
            errors.add(field, error);
        }
        Self::InvalidReference(errors)
    }
}

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { .. } => AppError::NotFound(err.to_string()),
            CatalogError::InvalidReference(errors) => AppError::ValidationError(errors),
            CatalogError::InvalidPage => AppError::NotFound(INVALID_PAGE.to_string()),
            CatalogError::CategoryInUse { .. } => AppError::Conflict(err.to_string()),
            CatalogError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_not_found_message_names_resource() {
        let err = CatalogError::not_found("Tag", 7);
        assert_eq!(err.to_string(), "Tag with id 7 not found");
        assert!(matches!(
            AppError::from(err),
            AppError::NotFound(msg) if msg == "Tag with id 7 not found"
        ));
    }

    #[test]
    fn test_missing_reference_is_a_field_error() {
        let err = CatalogError::missing_reference("category_id", &[9]);
        let AppError::ValidationError(errors) = AppError::from(err) else {
            panic!("expected a validation error");
        };

        let field_errors = errors.field_errors();
        let entry = &field_errors["category_id"][0];
        assert_eq!(entry.code, "does_not_exist");
        assert_eq!(
            entry.message.as_deref(),
            Some("Invalid pk \"9\" - object does not exist.")
        );
        assert_eq!(entry.params["value"], 9);
    }

    #[test]
    fn test_missing_reference_lists_every_id() {
        let CatalogError::InvalidReference(errors) = CatalogError::missing_reference("tags", &[3, 8])
        else {
            panic!("expected an invalid reference");
        };
        assert_eq!(errors.field_errors()["tags"].len(), 2);
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (CatalogError::InvalidPage, StatusCode::NOT_FOUND),
            (
                CatalogError::CategoryInUse { id: 1, products: 2 },
                StatusCode::CONFLICT,
            ),
            (
                CatalogError::Database(DbErr::Custom("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CatalogError::missing_reference("tags", &[3]),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_invalid_page_message() {
        assert!(matches!(
            AppError::from(CatalogError::InvalidPage),
            AppError::NotFound(msg) if msg == "Invalid page."
        ));
    }
}
