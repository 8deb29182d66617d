//! Services layer for recipe-service.
//!
//! `Database` owns the SQL; the stores on top of it enforce identity,
//! credential and ownership rules.

mod database;
pub mod error;
mod recipes;
mod token;
mod user_store;

pub use database::Database;
pub use error::ServiceError;
pub use recipes::{NewRecipe, RecipeStore, RecipeUpdate};
pub use token::TokenService;
pub use user_store::{NewUser, ProfileUpdate, UserStore};

#[cfg(test)]
pub(crate) async fn test_database() -> Database {
    let config = crate::config::RecipeConfig::for_testing();
    let pool = crate::db::create_pool(&config.database)
        .await
        .expect("in-memory pool");
    crate::db::run_migrations(&pool).await.expect("migrations");
    Database::new(pool)
}
