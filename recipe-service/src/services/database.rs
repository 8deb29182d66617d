//! SQLite database service for recipe-service.
//!
//! Every query on an owned table filters by `user_id`; callers never see
//! rows belonging to another user.

use chrono::Utc;
use service_core::error::AppError;
use sqlx::{
    sqlite::{SqlitePool, SqliteConnection},
    QueryBuilder, Sqlite, Transaction,
};

use crate::models::{Attribute, AttributeKind, AuthToken, RecipeFields, RecipeRow, User};

/// SQLite database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), AppError> {
        crate::db::health_check(&self.pool).await.map_err(|e| {
            tracing::error!("Database health check failed: {}", e);
            AppError::DatabaseError(anyhow::anyhow!("Database health check failed: {}", e))
        })
    }

    // ==================== User Operations ====================

    /// Insert a new user with default flags.
    pub async fn insert_user(
        &self,
        email: &str,
        name: &str,
        password_hash: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    /// Find user by email, ignoring case.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// Update name and/or password hash; `None` keeps the stored value.
    pub async fn update_user_profile(
        &self,
        user_id: i64,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                password_hash = COALESCE($2, password_hash),
                updated_utc = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_user_flags(
        &self,
        user_id: i64,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_staff = $1, is_superuser = $2, updated_utc = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(is_staff)
        .bind(is_superuser)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_user_active(
        &self,
        user_id: i64,
        is_active: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = $1, updated_utc = $2 WHERE id = $3 RETURNING *",
        )
        .bind(is_active)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    // ==================== Token Operations ====================

    pub async fn find_token_for_user(&self, user_id: i64) -> Result<Option<AuthToken>, sqlx::Error> {
        sqlx::query_as::<_, AuthToken>("SELECT * FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Insert a token unless the user already has one.
    pub async fn insert_token_if_absent(&self, key: &str, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (key, user_id, created_utc)
            VALUES ($1, $2, $3)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Find the user a token key is bound to.
    pub async fn find_user_by_token(&self, key: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN auth_tokens t ON t.user_id = u.id
            WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_tokens_for_user(&self, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ==================== Tag / Ingredient Operations ====================

    /// List the owner's tags or ingredients, newest name first.
    pub async fn list_attributes(
        &self,
        kind: AttributeKind,
        user_id: i64,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, sqlx::Error> {
        let sql = if assigned_only {
            format!(
                "SELECT DISTINCT a.* FROM {table} a \
                 JOIN {link} l ON l.{column} = a.id \
                 WHERE a.user_id = $1 \
                 ORDER BY a.name DESC, a.id DESC",
                table = kind.table(),
                link = kind.link_table(),
                column = kind.link_column(),
            )
        } else {
            format!(
                "SELECT * FROM {} WHERE user_id = $1 ORDER BY name DESC, id DESC",
                kind.table()
            )
        };

        sqlx::query_as::<_, Attribute>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_attribute(
        &self,
        kind: AttributeKind,
        user_id: i64,
        id: i64,
    ) -> Result<Option<Attribute>, sqlx::Error> {
        let sql = format!("SELECT * FROM {} WHERE id = $1 AND user_id = $2", kind.table());
        sqlx::query_as::<_, Attribute>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert_attribute(
        &self,
        kind: AttributeKind,
        user_id: i64,
        name: &str,
    ) -> Result<Attribute, sqlx::Error> {
        let sql = format!(
            "INSERT INTO {} (user_id, name) VALUES ($1, $2) RETURNING *",
            kind.table()
        );
        sqlx::query_as::<_, Attribute>(&sql)
            .bind(user_id)
            .bind(name)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn update_attribute(
        &self,
        kind: AttributeKind,
        user_id: i64,
        id: i64,
        name: &str,
    ) -> Result<Option<Attribute>, sqlx::Error> {
        let sql = format!(
            "UPDATE {} SET name = $1 WHERE id = $2 AND user_id = $3 RETURNING *",
            kind.table()
        );
        sqlx::query_as::<_, Attribute>(&sql)
            .bind(name)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Delete an owned row; association rows go with it. Returns false if
    /// nothing matched.
    pub async fn delete_attribute(
        &self,
        kind: AttributeKind,
        user_id: i64,
        id: i64,
    ) -> Result<bool, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", kind.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Subset of `ids` that exist and belong to `user_id`.
    pub async fn owned_attribute_ids(
        &self,
        kind: AttributeKind,
        user_id: i64,
        ids: &[i64],
    ) -> Result<Vec<i64>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM ");
        qb.push(kind.table());
        qb.push(" WHERE user_id = ");
        qb.push_bind(user_id);
        qb.push(" AND id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(i64,)> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Attributes attached to one recipe, ordered by name.
    pub async fn attributes_for_recipe(
        &self,
        kind: AttributeKind,
        recipe_id: i64,
    ) -> Result<Vec<Attribute>, sqlx::Error> {
        let sql = format!(
            "SELECT a.* FROM {table} a \
             JOIN {link} l ON l.{column} = a.id \
             WHERE l.recipe_id = $1 \
             ORDER BY a.name, a.id",
            table = kind.table(),
            link = kind.link_table(),
            column = kind.link_column(),
        );
        sqlx::query_as::<_, Attribute>(&sql)
            .bind(recipe_id)
            .fetch_all(&self.pool)
            .await
    }

    /// `(recipe_id, attribute_id)` pairs for a batch of recipes.
    pub async fn attribute_links(
        &self,
        kind: AttributeKind,
        recipe_ids: &[i64],
    ) -> Result<Vec<(i64, i64)>, sqlx::Error> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT recipe_id, ");
        qb.push(kind.link_column());
        qb.push(" FROM ");
        qb.push(kind.link_table());
        qb.push(" WHERE recipe_id IN (");
        let mut separated = qb.separated(", ");
        for id in recipe_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        qb.push(" ORDER BY recipe_id, ");
        qb.push(kind.link_column());

        qb.build_query_as().fetch_all(&self.pool).await
    }

    // ==================== Recipe Operations ====================

    /// Owner's recipes, newest first. A tag or ingredient filter keeps
    /// recipes linked to any of the listed ids.
    pub async fn list_recipes(
        &self,
        user_id: i64,
        tag_ids: Option<&[i64]>,
        ingredient_ids: Option<&[i64]>,
    ) -> Result<Vec<RecipeRow>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT r.* FROM recipes r WHERE r.user_id = ");
        qb.push_bind(user_id);

        for (kind, ids) in [
            (AttributeKind::Tag, tag_ids),
            (AttributeKind::Ingredient, ingredient_ids),
        ] {
            let Some(ids) = ids else { continue };
            if ids.is_empty() {
                continue;
            }
            qb.push(" AND r.id IN (SELECT recipe_id FROM ");
            qb.push(kind.link_table());
            qb.push(" WHERE ");
            qb.push(kind.link_column());
            qb.push(" IN (");
            let mut separated = qb.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated("))");
        }

        qb.push(" ORDER BY r.id DESC");
        qb.build_query_as().fetch_all(&self.pool).await
    }

    pub async fn find_recipe(&self, user_id: i64, id: i64) -> Result<Option<RecipeRow>, sqlx::Error> {
        sqlx::query_as::<_, RecipeRow>("SELECT * FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn delete_recipe(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert a recipe inside the caller's transaction.
    pub async fn insert_recipe(
        conn: &mut SqliteConnection,
        user_id: i64,
        fields: &RecipeFields,
    ) -> Result<RecipeRow, sqlx::Error> {
        sqlx::query_as::<_, RecipeRow>(
            r#"
            INSERT INTO recipes (user_id, title, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&fields.title)
        .bind(fields.time_minutes)
        .bind(price_text(fields))
        .bind(&fields.link)
        .fetch_one(&mut *conn)
        .await
    }

    /// Overwrite an owned recipe's columns inside the caller's transaction.
    pub async fn update_recipe(
        conn: &mut SqliteConnection,
        user_id: i64,
        id: i64,
        fields: &RecipeFields,
    ) -> Result<Option<RecipeRow>, sqlx::Error> {
        sqlx::query_as::<_, RecipeRow>(
            r#"
            UPDATE recipes
            SET title = $1, time_minutes = $2, price = $3, link = $4
            WHERE id = $5 AND user_id = $6
            RETURNING *
            "#,
        )
        .bind(&fields.title)
        .bind(fields.time_minutes)
        .bind(price_text(fields))
        .bind(&fields.link)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Replace a recipe's tag or ingredient links.
    pub async fn replace_links(
        conn: &mut SqliteConnection,
        kind: AttributeKind,
        recipe_id: i64,
        ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE recipe_id = $1", kind.link_table());
        sqlx::query(&sql).bind(recipe_id).execute(&mut *conn).await?;

        if ids.is_empty() {
            return Ok(());
        }

        let mut qb = QueryBuilder::<Sqlite>::new("INSERT OR IGNORE INTO ");
        qb.push(kind.link_table());
        qb.push(" (recipe_id, ");
        qb.push(kind.link_column());
        qb.push(") ");
        qb.push_values(ids, |mut row, id| {
            row.push_bind(recipe_id).push_bind(*id);
        });
        qb.build().execute(&mut *conn).await?;
        Ok(())
    }
}

/// Prices are kept at two decimal places, so `5` is stored as `5.00`.
fn price_text(fields: &RecipeFields) -> String {
    let mut price = fields.price;
    price.rescale(2);
    price.to_string()
}
