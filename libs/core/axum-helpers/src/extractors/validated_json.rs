//! JSON body extractor that runs `validator` rules before the handler.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with validation.
///
/// Body rejections (bad JSON, wrong types, missing content type) become a 400
/// `JSON_EXTRACTION` error; rule violations become a 400 `VALIDATION_ERROR`
/// with per-field details.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct TagPayload {
///     #[validate(required, length(min = 1, max = 255))]
///     name: Option<String>,
/// }
///
/// async fn create_tag(ValidatedJson(payload): ValidatedJson<TagPayload>) -> StatusCode {
///     StatusCode::CREATED
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::post,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct TagPayload {
        #[validate(required, length(min = 1, max = 255))]
        name: Option<String>,
    }

    async fn post_json(body: &'static str) -> (StatusCode, Value) {
        let app = Router::new().route(
            "/tags",
            post(|ValidatedJson(p): ValidatedJson<TagPayload>| async move {
                p.name.unwrap_or_default()
            }),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tags")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_valid_payload_passes() {
        let (status, _) = post_json(r#"{"name": "organic"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_field_is_field_error() {
        let (status, body) = post_json("{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["details"]["name"][0]["code"], "required");
    }

    #[tokio::test]
    async fn test_empty_name_is_field_error() {
        let (status, body) = post_json(r#"{"name": ""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["name"][0]["code"], "length");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (status, body) = post_json(r#"{"name": "#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "JSON_EXTRACTION");
    }

    #[tokio::test]
    async fn test_wrong_type_is_bad_request() {
        let (status, body) = post_json(r#"{"name": 12}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "JSON_EXTRACTION");
    }
}
