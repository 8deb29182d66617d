use rust_decimal::Decimal;
use serde::Deserialize;
use service_core::error::AppError;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::not_blank;
use crate::models::RecipeFields;
use crate::services::{NewRecipe, RecipeUpdate};

/// Body for creating or replacing a tag or ingredient.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AttributeRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    #[schema(example = "Vegan")]
    pub name: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AttributePatchRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttributeListParams {
    /// `1` to list only rows attached to at least one recipe.
    pub assigned_only: Option<u8>,
}

impl AttributeListParams {
    pub fn assigned_only(&self) -> bool {
        self.assigned_only.unwrap_or(0) != 0
    }
}

/// Body for creating or replacing a recipe.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecipeRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Title must be at most 255 characters")
    )]
    #[schema(example = "Chocolate cheesecake")]
    pub title: String,

    #[validate(range(min = 0, message = "Time must not be negative"))]
    #[schema(example = 30)]
    pub time_minutes: i64,

    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "5.00")]
    pub price: Decimal,

    #[serde(default)]
    #[validate(length(max = 255, message = "Link must be at most 255 characters"))]
    pub link: String,

    /// Omitted on update: links are left as they are.
    #[serde(default)]
    pub tags: Option<Vec<i64>>,

    #[serde(default)]
    pub ingredients: Option<Vec<i64>>,
}

impl From<RecipeRequest> for NewRecipe {
    fn from(req: RecipeRequest) -> Self {
        Self {
            fields: RecipeFields {
                title: req.title,
                time_minutes: req.time_minutes,
                price: req.price,
                link: req.link,
            },
            tags: req.tags.unwrap_or_default(),
            ingredients: req.ingredients.unwrap_or_default(),
        }
    }
}

/// Full replacement of the recipe's columns.
impl From<RecipeRequest> for RecipeUpdate {
    fn from(req: RecipeRequest) -> Self {
        Self {
            title: Some(req.title),
            time_minutes: Some(req.time_minutes),
            price: Some(req.price),
            link: Some(req.link),
            tags: req.tags,
            ingredients: req.ingredients,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RecipePatchRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Title must be at most 255 characters")
    )]
    pub title: Option<String>,

    #[validate(range(min = 0, message = "Time must not be negative"))]
    pub time_minutes: Option<i64>,

    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,

    #[validate(length(max = 255, message = "Link must be at most 255 characters"))]
    pub link: Option<String>,

    pub tags: Option<Vec<i64>>,

    pub ingredients: Option<Vec<i64>>,
}

impl From<RecipePatchRequest> for RecipeUpdate {
    fn from(req: RecipePatchRequest) -> Self {
        Self {
            title: req.title,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
            tags: req.tags,
            ingredients: req.ingredients,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListParams {
    /// Comma separated tag ids, e.g. `1,2`.
    pub tags: Option<String>,
    /// Comma separated ingredient ids, e.g. `3`.
    pub ingredients: Option<String>,
}

impl RecipeListParams {
    pub fn tag_ids(&self) -> Result<Option<Vec<i64>>, AppError> {
        parse_id_list("tags", self.tags.as_deref())
    }

    pub fn ingredient_ids(&self) -> Result<Option<Vec<i64>>, AppError> {
        parse_id_list("ingredients", self.ingredients.as_deref())
    }
}

/// Parse `"1,2,3"` into ids. An absent or empty parameter means no filter.
fn parse_id_list(param: &str, raw: Option<&str>) -> Result<Option<Vec<i64>>, AppError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    raw.split(',')
        .map(|id| {
            id.trim().parse::<i64>().map_err(|_| {
                AppError::BadRequest(anyhow::anyhow!(
                    "'{}' must be a comma separated list of ids",
                    param
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Prices fit `max_digits = 5, decimal_places = 2` and are not negative.
fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    let max = Decimal::new(99_999, 2);
    if price.is_sign_negative() && !price.is_zero() {
        let mut err = ValidationError::new("price_negative");
        err.message = Some("Price must not be negative".into());
        return Err(err);
    }
    if price.normalize().scale() > 2 {
        let mut err = ValidationError::new("price_precision");
        err.message = Some("Price must have at most 2 decimal places".into());
        return Err(err);
    }
    if *price > max {
        let mut err = ValidationError::new("price_range");
        err.message = Some("Price must be at most 999.99".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(price: &str) -> RecipeRequest {
        serde_json::from_value(serde_json::json!({
            "title": "Sample recipe",
            "time_minutes": 10,
            "price": price,
        }))
        .unwrap()
    }

    #[test]
    fn optional_fields_default() {
        let req = recipe("5.00");
        assert!(req.link.is_empty());
        assert!(req.tags.is_none());
        assert!(req.validate().is_ok());

        let new_recipe = NewRecipe::from(req);
        assert!(new_recipe.tags.is_empty());
        assert!(new_recipe.ingredients.is_empty());
    }

    #[test]
    fn put_without_links_keeps_them() {
        let update = RecipeUpdate::from(recipe("5.00"));
        assert_eq!(update.title.as_deref(), Some("Sample recipe"));
        assert!(update.tags.is_none());
    }

    #[test]
    fn price_bounds() {
        assert!(recipe("999.99").validate().is_ok());
        assert!(recipe("1000.00").validate().is_err());
        assert!(recipe("-1.00").validate().is_err());
        assert!(recipe("1.005").validate().is_err());
        assert!(recipe("1.500").validate().is_ok());
    }

    #[test]
    fn parses_id_lists() {
        let params = RecipeListParams {
            tags: Some("1, 2".to_string()),
            ingredients: Some(String::new()),
        };
        assert_eq!(params.tag_ids().unwrap(), Some(vec![1, 2]));
        assert_eq!(params.ingredient_ids().unwrap(), None);
    }

    #[test]
    fn rejects_malformed_id_lists() {
        let params = RecipeListParams {
            tags: Some("1,abc".to_string()),
            ingredients: None,
        };
        assert!(params.tag_ids().is_err());
    }

    #[test]
    fn assigned_only_flag() {
        assert!(!AttributeListParams::default().assigned_only());
        assert!(AttributeListParams {
            assigned_only: Some(1)
        }
        .assigned_only());
    }
}
