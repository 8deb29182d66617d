pub mod attribute;
pub mod auth_token;
pub mod recipe;
pub mod user;

pub use attribute::{Attribute, AttributeKind, AttributeResponse};
pub use auth_token::AuthToken;
pub use recipe::{Recipe, RecipeDetailResponse, RecipeFields, RecipeResponse, RecipeRow};
pub use user::{User, UserResponse};
