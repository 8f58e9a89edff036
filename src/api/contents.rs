//! Content endpoints. Everything here sits behind the auth layer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::{
    Content, ContentFilters, ContentPage, ContentStatus, ContentType, ContentWithRelations,
    CreateContentRequest, Pagination, UpdateContentRequest,
};
use crate::AppState;

use super::auth::AuthUser;
use super::error::ApiError;
use super::validation::{parse_pagination, validate_content_update, validate_new_content};
use super::ApiResponse;

/// Listing query. Pagination values arrive as raw strings so junk input
/// can fall back to the defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContentsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub content_type: Option<String>,
    pub category_id: Option<i32>,
    pub search: Option<String>,
}

impl ListContentsQuery {
    fn filters(&self) -> Result<ContentFilters, ApiError> {
        let status = self
            .status
            .as_deref()
            .map(|s| {
                ContentStatus::from_str(s)
                    .map_err(|_| ApiError::validation("Invalid status filter"))
            })
            .transpose()?;
        let content_type = self
            .content_type
            .as_deref()
            .map(|s| {
                ContentType::from_str(s)
                    .map_err(|_| ApiError::validation("Invalid contentType filter"))
            })
            .transpose()?;

        Ok(ContentFilters {
            status,
            content_type,
            category_id: self.category_id,
            search: self.search.clone().filter(|s| !s.is_empty()),
        })
    }
}

/// GET /api/contents
pub async fn list_contents(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<ListContentsQuery>,
) -> Result<Json<ApiResponse<ContentPage>>, ApiError> {
    let (page, limit) = parse_pagination(query.page.as_deref(), query.limit.as_deref());
    let filters = query.filters()?;

    let (contents, total) = state.contents.list(&filters, page, limit).await?;
    let page = ContentPage {
        contents,
        pagination: Pagination::new(page, limit, total),
    };
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/contents/:id
pub async fn get_content(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<ApiResponse<ContentWithRelations>>, ApiError> {
    let content = state
        .contents
        .get_with_relations(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Content not found"))?;
    Ok(Json(ApiResponse::ok(content)))
}

/// POST /api/contents
pub async fn create_content(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateContentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Content>>), ApiError> {
    let new = validate_new_content(request)?;

    if let Some(category_id) = new.category_id {
        if state.categories.get(category_id).await?.is_none() {
            return Err(ApiError::validation("Category does not exist"));
        }
    }

    let content = state.contents.create(new, user.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            content,
            "Content created successfully",
        )),
    ))
}

/// PUT /api/contents/:id
pub async fn update_content(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<uuid::Uuid>,
    Json(request): Json<UpdateContentRequest>,
) -> Result<Json<ApiResponse<Content>>, ApiError> {
    if request.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }
    let update = validate_content_update(request)?;

    if let Some(category_id) = update.category_id {
        if state.categories.get(category_id).await?.is_none() {
            return Err(ApiError::validation("Category does not exist"));
        }
    }

    let content = state.contents.update(id, update, user.user_id).await?;
    Ok(Json(ApiResponse::with_message(
        content,
        "Content updated successfully",
    )))
}

/// DELETE /api/contents/:id
pub async fn delete_content(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.contents.delete(id, user.user_id, user.role).await?;
    Ok(Json(ApiResponse::message("Content deleted successfully")))
}

/// PATCH /api/contents/:id/publish
pub async fn publish_content(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<ApiResponse<Content>>, ApiError> {
    let content = state.contents.publish(id, user.user_id).await?;
    Ok(Json(ApiResponse::with_message(
        content,
        "Content published successfully",
    )))
}

/// PATCH /api/contents/:id/unpublish
pub async fn unpublish_content(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<ApiResponse<Content>>, ApiError> {
    let content = state.contents.unpublish(id, user.user_id).await?;
    Ok(Json(ApiResponse::with_message(
        content,
        "Content unpublished successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_parse_known_values() {
        let query = ListContentsQuery {
            status: Some("published".to_string()),
            content_type: Some("prayer".to_string()),
            category_id: Some(3),
            search: Some("rosario".to_string()),
            ..Default::default()
        };
        let filters = query.filters().unwrap();
        assert_eq!(filters.status, Some(ContentStatus::Published));
        assert_eq!(filters.content_type, Some(ContentType::Prayer));
        assert_eq!(filters.category_id, Some(3));
        assert_eq!(filters.search.as_deref(), Some("rosario"));
    }

    #[test]
    fn test_filters_reject_unknown_enum_values() {
        let query = ListContentsQuery {
            status: Some("pending".to_string()),
            ..Default::default()
        };
        assert!(query.filters().is_err());

        let query = ListContentsQuery {
            content_type: Some("video".to_string()),
            ..Default::default()
        };
        assert!(query.filters().is_err());
    }

    #[test]
    fn test_empty_search_is_dropped() {
        let query = ListContentsQuery {
            search: Some(String::new()),
            ..Default::default()
        };
        assert!(query.filters().unwrap().search.is_none());
    }
}
