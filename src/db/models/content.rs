//! Content models, DTOs and the pagination envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::category::Category;
use super::user::UserSummary;

/// Editorial content kinds, mirrored from the `content_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "content_type", rename_all = "snake_case")]
pub enum ContentType {
    Article,
    Document,
    Prayer,
    Homily,
    Qa,
    Page,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Document => "document",
            ContentType::Prayer => "prayer",
            ContentType::Homily => "homily",
            ContentType::Qa => "qa",
            ContentType::Page => "page",
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(ContentType::Article),
            "document" => Ok(ContentType::Document),
            "prayer" => Ok(ContentType::Prayer),
            "homily" => Ok(ContentType::Homily),
            "qa" => Ok(ContentType::Qa),
            "page" => Ok(ContentType::Page),
            _ => Err(format!("Unknown content type: {}", s)),
        }
    }
}

/// Publication lifecycle states, mirrored from the `content_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "content_status", rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Published,
    Archived,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ContentStatus::Draft),
            "published" => Ok(ContentStatus::Published),
            "archived" => Ok(ContentStatus::Archived),
            _ => Err(format!("Unknown content status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub content_type: ContentType,
    pub status: ContentStatus,
    pub category_id: Option<i32>,
    pub featured_image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub view_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

/// Content with its category and creator/updater summaries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentWithRelations {
    #[serde(flatten)]
    pub content: Content,
    pub category: Option<Category>,
    pub created_by_user: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by_user: Option<UserSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    /// Validated against the closed `ContentType` set by the route layer.
    pub content_type: Option<String>,
    /// Validated against the closed `ContentStatus` set; defaults to draft.
    pub status: Option<String>,
    pub category_id: Option<i32>,
    pub featured_image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

/// Partial update: absent fields are left untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub content_type: Option<String>,
    pub status: Option<String>,
    pub category_id: Option<i32>,
    pub featured_image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl UpdateContentRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.excerpt.is_none()
            && self.body.is_none()
            && self.content_type.is_none()
            && self.status.is_none()
            && self.category_id.is_none()
            && self.featured_image_url.is_none()
            && self.meta_title.is_none()
            && self.meta_description.is_none()
    }
}

/// Validated create input handed to the store.
#[derive(Debug)]
pub struct NewContent {
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub content_type: ContentType,
    pub status: ContentStatus,
    pub category_id: Option<i32>,
    pub featured_image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

/// Validated partial update handed to the store.
#[derive(Debug, Default)]
pub struct ContentUpdate {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub content_type: Option<ContentType>,
    pub status: Option<ContentStatus>,
    pub category_id: Option<i32>,
    pub featured_image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

/// Equality and substring filters for content listing.
#[derive(Debug, Default)]
pub struct ContentFilters {
    pub status: Option<ContentStatus>,
    pub content_type: Option<ContentType>,
    pub category_id: Option<i32>,
    /// Case-insensitive substring match over title, excerpt and body.
    pub search: Option<String>,
}

/// Offset pagination metadata returned with every list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContentPage {
    pub contents: Vec<ContentWithRelations>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_content_type_round_trip() {
        for ty in [
            ContentType::Article,
            ContentType::Document,
            ContentType::Prayer,
            ContentType::Homily,
            ContentType::Qa,
            ContentType::Page,
        ] {
            assert_eq!(ContentType::from_str(ty.as_str()).unwrap(), ty);
        }
    }

    #[test]
    fn test_content_type_rejects_unknown() {
        assert!(ContentType::from_str("video").is_err());
        assert!(ContentType::from_str("Article").is_err());
    }

    #[test]
    fn test_content_status_closed_set() {
        assert_eq!(
            ContentStatus::from_str("draft").unwrap(),
            ContentStatus::Draft
        );
        assert!(ContentStatus::from_str("pending").is_err());
    }

    #[test]
    fn test_pagination_total_pages() {
        // 45 rows at 20 per page -> 3 pages
        let p = Pagination::new(2, 20, 45);
        assert_eq!(p.total_pages, 3);

        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages, 2);
    }

    #[test]
    fn test_update_request_is_empty() {
        let req: UpdateContentRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());

        let req: UpdateContentRequest =
            serde_json::from_str(r#"{"title": "New title"}"#).unwrap();
        assert!(!req.is_empty());
    }
}
