//! Content store: CRUD, slugging, filtered pagination, and the
//! publish/unpublish lifecycle.

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::error;
use uuid::Uuid;

use super::{is_unique_violation, slugify, StoreError};
use crate::db::{
    Category, Content, ContentFilters, ContentUpdate, ContentWithRelations, NewContent, Role,
    UserSummary,
};

#[derive(Clone)]
pub struct ContentStore {
    pool: PgPool,
}

impl ContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &ContentFilters) {
        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(content_type) = filters.content_type {
            qb.push(" AND content_type = ").push_bind(content_type);
        }
        if let Some(category_id) = filters.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(search) = &filters.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR excerpt ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR body ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// Filtered, paginated listing ordered by creation time descending.
    /// `page` is 1-indexed. Returns the page of rows plus the total
    /// matching count.
    pub async fn list(
        &self,
        filters: &ContentFilters,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<ContentWithRelations>, i64), StoreError> {
        let offset = (page - 1) * limit;

        let mut qb = QueryBuilder::new("SELECT * FROM contents WHERE TRUE");
        Self::push_filters(&mut qb, filters);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let contents = qb
            .build_query_as::<Content>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM contents WHERE TRUE");
        Self::push_filters(&mut count_qb, filters);
        let total: (i64,) = count_qb.build_query_as().fetch_one(&self.pool).await?;

        let mut rows = Vec::with_capacity(contents.len());
        for content in contents {
            rows.push(self.attach_relations(content, false).await?);
        }

        Ok((rows, total.0))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Content>, StoreError> {
        let content = sqlx::query_as::<_, Content>("SELECT * FROM contents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(content)
    }

    pub async fn get_with_relations(
        &self,
        id: Uuid,
    ) -> Result<Option<ContentWithRelations>, StoreError> {
        match self.get(id).await? {
            Some(content) => Ok(Some(self.attach_relations(content, true).await?)),
            None => Ok(None),
        }
    }

    async fn attach_relations(
        &self,
        content: Content,
        with_updater: bool,
    ) -> Result<ContentWithRelations, StoreError> {
        let category = match content.category_id {
            Some(category_id) => {
                sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
                    .bind(category_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let created_by_user = self.user_summary(content.created_by).await?;
        let updated_by_user = if with_updater {
            self.user_summary(content.updated_by).await?
        } else {
            None
        };

        Ok(ContentWithRelations {
            content,
            category,
            created_by_user,
            updated_by_user,
        })
    }

    async fn user_summary(&self, id: Option<Uuid>) -> Result<Option<UserSummary>, StoreError> {
        let Some(id) = id else {
            return Ok(None);
        };
        let summary = sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, full_name FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(summary)
    }

    /// Create a content row in the requested status (draft by default).
    /// The actor is stamped as both creator and last updater.
    pub async fn create(&self, new: NewContent, actor_id: Uuid) -> Result<Content, StoreError> {
        let slug = slugify(&new.title);

        let content = sqlx::query_as::<_, Content>(
            r#"
            INSERT INTO contents (
                title, slug, excerpt, body, content_type, status, category_id,
                featured_image_url, meta_title, meta_description, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(&new.title)
        .bind(&slug)
        .bind(&new.excerpt)
        .bind(&new.body)
        .bind(new.content_type)
        .bind(new.status)
        .bind(new.category_id)
        .bind(&new.featured_image_url)
        .bind(&new.meta_title)
        .bind(&new.meta_description)
        .bind(actor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict("A content with similar title already exists")
            } else {
                error!("Failed to create content: {}", e);
                StoreError::Database(e)
            }
        })?;

        Ok(content)
    }

    /// Partial update. The slug is recomputed only when the title is part
    /// of the update and differs from the stored value. The actor and
    /// update timestamp are always stamped.
    pub async fn update(
        &self,
        id: Uuid,
        update: ContentUpdate,
        actor_id: Uuid,
    ) -> Result<Content, StoreError> {
        let existing = self.get(id).await?.ok_or(StoreError::NotFound("Content"))?;

        let slug = match &update.title {
            Some(title) if *title != existing.title => slugify(title),
            _ => existing.slug.clone(),
        };

        let content = sqlx::query_as::<_, Content>(
            r#"
            UPDATE contents SET
                title = COALESCE($1, title),
                slug = $2,
                excerpt = COALESCE($3, excerpt),
                body = COALESCE($4, body),
                content_type = COALESCE($5, content_type),
                status = COALESCE($6, status),
                category_id = COALESCE($7, category_id),
                featured_image_url = COALESCE($8, featured_image_url),
                meta_title = COALESCE($9, meta_title),
                meta_description = COALESCE($10, meta_description),
                updated_by = $11,
                updated_at = now()
            WHERE id = $12
            RETURNING *
            "#,
        )
        .bind(&update.title)
        .bind(&slug)
        .bind(&update.excerpt)
        .bind(&update.body)
        .bind(update.content_type)
        .bind(update.status)
        .bind(update.category_id)
        .bind(&update.featured_image_url)
        .bind(&update.meta_title)
        .bind(&update.meta_description)
        .bind(actor_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict("A content with similar title already exists")
            } else {
                error!("Failed to update content: {}", e);
                StoreError::Database(e)
            }
        })?;

        Ok(content)
    }

    /// Delete a content row. Permitted to admins and to the original
    /// creator; everyone else gets a Forbidden distinct from NotFound.
    pub async fn delete(
        &self,
        id: Uuid,
        actor_id: Uuid,
        actor_role: Role,
    ) -> Result<(), StoreError> {
        let existing = self.get(id).await?.ok_or(StoreError::NotFound("Content"))?;

        if !can_delete(actor_role, actor_id, existing.created_by) {
            return Err(StoreError::Forbidden(
                "You do not have permission to delete this content",
            ));
        }

        sqlx::query("DELETE FROM contents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Set the status to published. `published_at` is stamped on the
    /// first publish only; republishing keeps the original date.
    pub async fn publish(&self, id: Uuid, actor_id: Uuid) -> Result<Content, StoreError> {
        let content = sqlx::query_as::<_, Content>(
            r#"
            UPDATE contents SET
                status = 'published',
                published_at = COALESCE(published_at, now()),
                updated_by = $1,
                updated_at = now()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(actor_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Content"))?;

        Ok(content)
    }

    /// Set the status back to draft. `published_at` is deliberately left
    /// in place so the original publication date survives.
    pub async fn unpublish(&self, id: Uuid, actor_id: Uuid) -> Result<Content, StoreError> {
        let content = sqlx::query_as::<_, Content>(
            r#"
            UPDATE contents SET
                status = 'draft',
                updated_by = $1,
                updated_at = now()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(actor_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Content"))?;

        Ok(content)
    }
}

/// Deletion is permitted iff the actor is an admin or the original
/// creator of the row.
fn can_delete(actor_role: Role, actor_id: Uuid, created_by: Option<Uuid>) -> bool {
    actor_role == Role::Admin || created_by == Some(actor_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_can_delete_anything() {
        let admin = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(can_delete(Role::Admin, admin, Some(other)));
        assert!(can_delete(Role::Admin, admin, None));
    }

    #[test]
    fn test_creator_can_delete_own_content() {
        let creator = Uuid::new_v4();
        assert!(can_delete(Role::ContentManager, creator, Some(creator)));
        assert!(can_delete(Role::Viewer, creator, Some(creator)));
    }

    #[test]
    fn test_non_creator_cannot_delete() {
        let actor = Uuid::new_v4();
        let creator = Uuid::new_v4();
        assert!(!can_delete(Role::ContentManager, actor, Some(creator)));
        assert!(!can_delete(Role::Viewer, actor, None));
    }
}
