use service_core::error::AppError;

mod attribute;
pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;

/// Method fallback for every route, so a 405 carries the usual JSON error body.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
