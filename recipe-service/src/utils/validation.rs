use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::Validate;

/// JSON body that has passed `validator` checks.
///
/// Malformed JSON, missing fields and failed validation all reject with 400.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e.body_text())))?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Numeric `:id` path segment.
///
/// An id that does not parse cannot name a row, so it is reported as 404
/// like any other missing row.
pub struct ResourceId(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e.body_text(), "Unparseable resource id");
                AppError::NotFound(anyhow::anyhow!("Not found"))
            })?;

        Ok(ResourceId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route(
            "/things/:id/",
            get(|ResourceId(id): ResourceId| async move { id.to_string() }),
        )
    }

    async fn status_for(uri: &str) -> StatusCode {
        let request = HttpRequest::builder().uri(uri).body(Body::empty()).unwrap();
        app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn numeric_id_is_extracted() {
        assert_eq!(status_for("/things/42/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn non_numeric_id_is_not_found() {
        assert_eq!(status_for("/things/abc/").await, StatusCode::NOT_FOUND);
        assert_eq!(
            status_for("/things/99999999999999999999/").await,
            StatusCode::NOT_FOUND
        );
    }
}
