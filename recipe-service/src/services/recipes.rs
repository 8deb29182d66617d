//! Owner-scoped tags, ingredients and recipes.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;

use crate::{
    models::{
        Attribute, AttributeKind, AttributeResponse, Recipe, RecipeDetailResponse, RecipeFields,
        RecipeResponse, RecipeRow,
    },
    services::{Database, ServiceError},
};

/// A recipe to create, with the ids of the tags and ingredients to attach.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub fields: RecipeFields,
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
}

/// Changes to an existing recipe. `None` keeps the current value; `Some` on
/// `tags`/`ingredients` replaces the whole set.
#[derive(Debug, Clone, Default)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub time_minutes: Option<i64>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

impl RecipeUpdate {
    fn apply(&self, current: &Recipe) -> RecipeFields {
        let mut fields = RecipeFields::from(current);
        if let Some(ref title) = self.title {
            fields.title = title.trim().to_string();
        }
        if let Some(time_minutes) = self.time_minutes {
            fields.time_minutes = time_minutes;
        }
        if let Some(price) = self.price {
            fields.price = price;
        }
        if let Some(ref link) = self.link {
            fields.link = link.trim().to_string();
        }
        fields
    }
}

#[derive(Clone)]
pub struct RecipeStore {
    db: Database,
}

impl RecipeStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // ==================== Tags / Ingredients ====================

    pub async fn list_attributes(
        &self,
        kind: AttributeKind,
        user_id: i64,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, ServiceError> {
        Ok(self.db.list_attributes(kind, user_id, assigned_only).await?)
    }

    pub async fn get_attribute(
        &self,
        kind: AttributeKind,
        user_id: i64,
        id: i64,
    ) -> Result<Attribute, ServiceError> {
        self.db
            .find_attribute(kind, user_id, id)
            .await?
            .ok_or(ServiceError::NotFound(kind.label()))
    }

    pub async fn create_attribute(
        &self,
        kind: AttributeKind,
        user_id: i64,
        name: &str,
    ) -> Result<Attribute, ServiceError> {
        let attribute = self.db.insert_attribute(kind, user_id, name.trim()).await?;
        tracing::info!(user_id, id = attribute.id, kind = %kind, "Created");
        Ok(attribute)
    }

    /// Rename an owned tag or ingredient. Without a new name the row is
    /// returned unchanged.
    pub async fn update_attribute(
        &self,
        kind: AttributeKind,
        user_id: i64,
        id: i64,
        name: Option<&str>,
    ) -> Result<Attribute, ServiceError> {
        let Some(name) = name else {
            return self.get_attribute(kind, user_id, id).await;
        };

        self.db
            .update_attribute(kind, user_id, id, name.trim())
            .await?
            .ok_or(ServiceError::NotFound(kind.label()))
    }

    /// Delete an owned tag or ingredient. Recipes that used it keep existing.
    pub async fn delete_attribute(
        &self,
        kind: AttributeKind,
        user_id: i64,
        id: i64,
    ) -> Result<(), ServiceError> {
        if !self.db.delete_attribute(kind, user_id, id).await? {
            return Err(ServiceError::NotFound(kind.label()));
        }
        tracing::info!(user_id, id, kind = %kind, "Deleted");
        Ok(())
    }

    // ==================== Recipes ====================

    pub async fn list_recipes(
        &self,
        user_id: i64,
        tag_ids: Option<&[i64]>,
        ingredient_ids: Option<&[i64]>,
    ) -> Result<Vec<RecipeResponse>, ServiceError> {
        let rows = self.db.list_recipes(user_id, tag_ids, ingredient_ids).await?;
        let recipe_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let mut tags = self.links_by_recipe(AttributeKind::Tag, &recipe_ids).await?;
        let mut ingredients = self
            .links_by_recipe(AttributeKind::Ingredient, &recipe_ids)
            .await?;

        rows.into_iter()
            .map(|row| -> Result<RecipeResponse, ServiceError> {
                let recipe = Recipe::try_from(row)?;
                Ok(RecipeResponse {
                    tags: tags.remove(&recipe.id).unwrap_or_default(),
                    ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
                    id: recipe.id,
                    title: recipe.title,
                    time_minutes: recipe.time_minutes,
                    price: recipe.price,
                    link: recipe.link,
                })
            })
            .collect()
    }

    pub async fn get_recipe(&self, user_id: i64, id: i64) -> Result<RecipeDetailResponse, ServiceError> {
        let row = self
            .db
            .find_recipe(user_id, id)
            .await?
            .ok_or(ServiceError::NotFound("Recipe"))?;
        self.detail(row).await
    }

    /// Insert a recipe and its links in one transaction.
    pub async fn create_recipe(
        &self,
        user_id: i64,
        new_recipe: NewRecipe,
    ) -> Result<RecipeDetailResponse, ServiceError> {
        self.ensure_owned(AttributeKind::Tag, user_id, &new_recipe.tags)
            .await?;
        self.ensure_owned(AttributeKind::Ingredient, user_id, &new_recipe.ingredients)
            .await?;

        let mut fields = new_recipe.fields;
        fields.title = fields.title.trim().to_string();
        fields.link = fields.link.trim().to_string();

        let mut tx = self.db.begin().await?;
        let row = Database::insert_recipe(&mut *tx, user_id, &fields).await?;
        Database::replace_links(&mut *tx, AttributeKind::Tag, row.id, &new_recipe.tags).await?;
        Database::replace_links(&mut *tx, AttributeKind::Ingredient, row.id, &new_recipe.ingredients)
            .await?;
        tx.commit().await?;

        tracing::info!(user_id, recipe_id = row.id, "Recipe created");
        self.detail(row).await
    }

    /// Apply `update` to an owned recipe in one transaction.
    pub async fn update_recipe(
        &self,
        user_id: i64,
        id: i64,
        update: RecipeUpdate,
    ) -> Result<RecipeDetailResponse, ServiceError> {
        let current = self
            .db
            .find_recipe(user_id, id)
            .await?
            .ok_or(ServiceError::NotFound("Recipe"))?;
        let current = Recipe::try_from(current)?;

        if let Some(ref tags) = update.tags {
            self.ensure_owned(AttributeKind::Tag, user_id, tags).await?;
        }
        if let Some(ref ingredients) = update.ingredients {
            self.ensure_owned(AttributeKind::Ingredient, user_id, ingredients)
                .await?;
        }

        let fields = update.apply(&current);

        let mut tx = self.db.begin().await?;
        let row = Database::update_recipe(&mut *tx, user_id, id, &fields)
            .await?
            .ok_or(ServiceError::NotFound("Recipe"))?;
        if let Some(ref tags) = update.tags {
            Database::replace_links(&mut *tx, AttributeKind::Tag, id, tags).await?;
        }
        if let Some(ref ingredients) = update.ingredients {
            Database::replace_links(&mut *tx, AttributeKind::Ingredient, id, ingredients).await?;
        }
        tx.commit().await?;

        tracing::info!(user_id, recipe_id = id, "Recipe updated");
        self.detail(row).await
    }

    pub async fn delete_recipe(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        if !self.db.delete_recipe(user_id, id).await? {
            return Err(ServiceError::NotFound("Recipe"));
        }
        tracing::info!(user_id, recipe_id = id, "Recipe deleted");
        Ok(())
    }

    // ==================== Helpers ====================

    async fn detail(&self, row: RecipeRow) -> Result<RecipeDetailResponse, ServiceError> {
        let recipe = Recipe::try_from(row)?;
        let tags = self
            .db
            .attributes_for_recipe(AttributeKind::Tag, recipe.id)
            .await?;
        let ingredients = self
            .db
            .attributes_for_recipe(AttributeKind::Ingredient, recipe.id)
            .await?;

        Ok(RecipeDetailResponse {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: tags.into_iter().map(AttributeResponse::from).collect(),
            ingredients: ingredients.into_iter().map(AttributeResponse::from).collect(),
        })
    }

    async fn links_by_recipe(
        &self,
        kind: AttributeKind,
        recipe_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<i64>>, ServiceError> {
        let mut links: HashMap<i64, Vec<i64>> = HashMap::new();
        for (recipe_id, attribute_id) in self.db.attribute_links(kind, recipe_ids).await? {
            links.entry(recipe_id).or_default().push(attribute_id);
        }
        Ok(links)
    }

    /// Every id must name a row the caller owns. Other users' rows are
    /// reported the same as missing ones.
    async fn ensure_owned(
        &self,
        kind: AttributeKind,
        user_id: i64,
        ids: &[i64],
    ) -> Result<(), ServiceError> {
        let wanted: BTreeSet<i64> = ids.iter().copied().collect();
        if wanted.is_empty() {
            return Ok(());
        }

        let requested: Vec<i64> = wanted.iter().copied().collect();
        let owned: BTreeSet<i64> = self
            .db
            .owned_attribute_ids(kind, user_id, &requested)
            .await?
            .into_iter()
            .collect();

        match wanted.difference(&owned).next() {
            Some(&id) => Err(ServiceError::InvalidReference { kind, id }),
            None => Ok(()),
        }
    }
}
