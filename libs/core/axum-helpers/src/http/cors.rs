use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// CORS layer for the given origins.
///
/// Fails when the list is empty or an origin is not a valid header value.
/// Allows GET, POST, PUT, DELETE and OPTIONS with JSON content headers and
/// exposes `Location` so browsers can follow created resources.
pub fn create_cors_layer(origins: &[String]) -> io::Result<CorsLayer> {
    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN is required. Example: CORS_ALLOWED_ORIGIN=http://localhost:3000,https://shop.example.com",
        ));
    }

    let allowed = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION])
        .max_age(Duration::from_secs(3600)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_origins_are_rejected() {
        let err = create_cors_layer(&[]).unwrap_err();
        assert!(err.to_string().contains("CORS_ALLOWED_ORIGIN"));
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let err = create_cors_layer(&["http://bad\norigin".to_string()]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_valid_origins() {
        assert!(
            create_cors_layer(&[
                "http://localhost:3000".to_string(),
                "https://shop.example.com".to_string()
            ])
            .is_ok()
        );
    }
}
