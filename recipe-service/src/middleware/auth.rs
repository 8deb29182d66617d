use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::{models::User, AppState};

/// Authenticated caller, placed in request extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolve `Authorization: Token <key>` (or `Bearer <key>`) to an active user.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(token_from_header);

    let user = match state.token_service.resolve_token(key).await {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected request authentication");
            return Err(e.into());
        }
    };

    tracing::Span::current().record("user_id", user.id);
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Strip the `Token ` or `Bearer ` scheme, case-insensitively.
fn token_from_header(value: &str) -> &str {
    let value = value.trim();
    match value.split_once(' ') {
        Some((scheme, key))
            if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") =>
        {
            key.trim()
        }
        // Unknown scheme: treat as no credentials
        Some(_) => "",
        None => value,
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            AppError::AuthError(anyhow::anyhow!(
                "Authentication credentials were not provided"
            ))
        })
    }
}
