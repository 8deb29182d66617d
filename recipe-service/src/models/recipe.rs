//! Recipe model. Prices are exact decimals, stored as text.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::ToSchema;

use super::attribute::AttributeResponse;

/// Row as stored in SQLite.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub time_minutes: i64,
    pub price: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub time_minutes: i64,
    pub price: Decimal,
    pub link: String,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = anyhow::Error;

    fn try_from(row: RecipeRow) -> Result<Self, Self::Error> {
        let price = Decimal::from_str(&row.price)
            .map_err(|e| anyhow::anyhow!("Recipe {} has a corrupt price '{}': {}", row.id, row.price, e))?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            time_minutes: row.time_minutes,
            price,
            link: row.link,
        })
    }
}

impl std::fmt::Display for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Writable recipe columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeFields {
    pub title: String,
    pub time_minutes: i64,
    pub price: Decimal,
    pub link: String,
}

impl From<&Recipe> for RecipeFields {
    fn from(r: &Recipe) -> Self {
        Self {
            title: r.title.clone(),
            time_minutes: r.time_minutes,
            price: r.price,
            link: r.link.clone(),
        }
    }
}

/// List representation: related rows by id.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecipeResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Chocolate cheesecake")]
    pub title: String,
    #[schema(example = 30)]
    pub time_minutes: i64,
    #[schema(value_type = String, example = "5.00")]
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
}

/// Detail representation: related rows embedded.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecipeDetailResponse {
    pub id: i64,
    pub title: String,
    pub time_minutes: i64,
    #[schema(value_type = String, example = "5.00")]
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<AttributeResponse>,
    pub ingredients: Vec<AttributeResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(price: &str) -> RecipeRow {
        RecipeRow {
            id: 7,
            user_id: 1,
            title: "Steak and mushroom sauce".to_string(),
            time_minutes: 5,
            price: price.to_string(),
            link: String::new(),
        }
    }

    #[test]
    fn parses_stored_price_exactly() {
        let recipe = Recipe::try_from(row("5.00")).unwrap();
        assert_eq!(recipe.price, Decimal::new(500, 2));
        assert_eq!(recipe.to_string(), "Steak and mushroom sauce");
    }

    #[test]
    fn rejects_corrupt_price() {
        assert!(Recipe::try_from(row("five")).is_err());
    }
}
