//! Category store: CRUD, slugging, and the parent/child tree rules.

use sqlx::PgPool;
use tracing::error;

use super::{is_unique_violation, slugify, StoreError};
use crate::db::{Category, CategoryUpdate, CategoryWithRelations, NewCategory};

#[derive(Clone)]
pub struct CategoryStore {
    pool: PgPool,
}

impl CategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List categories ordered by display order then name. With
    /// `root_only`, only categories without a parent are returned.
    pub async fn list(&self, root_only: bool) -> Result<Vec<Category>, StoreError> {
        let sql = if root_only {
            "SELECT * FROM categories WHERE parent_id IS NULL ORDER BY display_order ASC, name ASC"
        } else {
            "SELECT * FROM categories ORDER BY display_order ASC, name ASC"
        };
        let categories = sqlx::query_as::<_, Category>(sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Category>, StoreError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    pub async fn get_with_relations(
        &self,
        id: i32,
    ) -> Result<Option<CategoryWithRelations>, StoreError> {
        let Some(category) = self.get(id).await? else {
            return Ok(None);
        };

        let parent = match category.parent_id {
            Some(parent_id) => self.get(parent_id).await?,
            None => None,
        };

        let children = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE parent_id = $1 ORDER BY display_order ASC, name ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(CategoryWithRelations {
            category,
            parent,
            children,
        }))
    }

    pub async fn create(&self, new: NewCategory) -> Result<Category, StoreError> {
        let slug = slugify(&new.name);

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, parent_id, display_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&slug)
        .bind(&new.description)
        .bind(new.parent_id)
        .bind(new.display_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict("A category with similar name already exists")
            } else {
                error!("Failed to create category: {}", e);
                StoreError::Database(e)
            }
        })?;

        Ok(category)
    }

    /// Partial update. The slug is recomputed only when the name changes.
    /// A parent change is refused when it would create a cycle.
    pub async fn update(&self, id: i32, update: CategoryUpdate) -> Result<Category, StoreError> {
        let existing = self
            .get(id)
            .await?
            .ok_or(StoreError::NotFound("Category"))?;

        let slug = match &update.name {
            Some(name) if *name != existing.name => slugify(name),
            _ => existing.slug.clone(),
        };

        if let Some(new_parent) = update.parent_id {
            if existing.parent_id != Some(new_parent) {
                self.check_no_cycle(id, new_parent).await?;
            }
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name = COALESCE($1, name),
                slug = $2,
                description = COALESCE($3, description),
                parent_id = COALESCE($4, parent_id),
                display_order = COALESCE($5, display_order),
                updated_at = now()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&update.name)
        .bind(&slug)
        .bind(&update.description)
        .bind(update.parent_id)
        .bind(update.display_order)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict("A category with similar name already exists")
            } else {
                error!("Failed to update category: {}", e);
                StoreError::Database(e)
            }
        })?;

        Ok(category)
    }

    /// Walk the ancestor chain of the proposed parent; reject when it
    /// reaches the category being re-parented (or the category itself).
    async fn check_no_cycle(&self, id: i32, new_parent: i32) -> Result<(), StoreError> {
        if new_parent == id {
            return Err(StoreError::Policy(
                "A category cannot be its own parent",
            ));
        }

        let mut cursor = Some(new_parent);
        while let Some(current) = cursor {
            let parent: Option<(Option<i32>,)> =
                sqlx::query_as("SELECT parent_id FROM categories WHERE id = $1")
                    .bind(current)
                    .fetch_optional(&self.pool)
                    .await?;

            let Some((parent_id,)) = parent else {
                return Err(StoreError::NotFound("Parent category"));
            };

            if parent_id == Some(id) {
                return Err(StoreError::Policy(
                    "Moving the category under one of its descendants would create a cycle",
                ));
            }
            cursor = parent_id;
        }

        Ok(())
    }

    /// Delete a category. Refused while children still reference it as
    /// parent. The check and the delete share one transaction so a child
    /// inserted concurrently cannot slip between them.
    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<Category> =
            sqlx::query_as("SELECT * FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Err(StoreError::NotFound("Category"));
        }

        let children: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if children.0 > 0 {
            return Err(StoreError::Policy(
                "Cannot delete category with subcategories",
            ));
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
