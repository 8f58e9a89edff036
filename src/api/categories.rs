//! Category endpoints. Reads are public; mutations require a session.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{
    Category, CategoryWithRelations, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::AppState;

use super::auth::AuthUser;
use super::error::ApiError;
use super::validation::{validate_category_update, validate_new_category};
use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    /// `root` or `null` restricts the listing to top-level categories.
    pub parent: Option<String>,
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<ApiResponse<Vec<Category>>>, ApiError> {
    let root_only = matches!(query.parent.as_deref(), Some("root") | Some("null"));
    let categories = state.categories.list(root_only).await?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// GET /api/categories/:id
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CategoryWithRelations>>, ApiError> {
    let category = state
        .categories
        .get_with_relations(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    Ok(Json(ApiResponse::ok(category)))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), ApiError> {
    let new = validate_new_category(request)?;

    if let Some(parent_id) = new.parent_id {
        if state.categories.get(parent_id).await?.is_none() {
            return Err(ApiError::validation("Parent category does not exist"));
        }
    }

    let category = state.categories.create(new).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            category,
            "Category created successfully",
        )),
    ))
}

/// PUT /api/categories/:id
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    let update = validate_category_update(request)?;
    let category = state.categories.update(id, update).await?;
    Ok(Json(ApiResponse::with_message(
        category,
        "Category updated successfully",
    )))
}

/// DELETE /api/categories/:id
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.categories.delete(id).await?;
    Ok(Json(ApiResponse::message("Category deleted successfully")))
}
