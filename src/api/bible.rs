//! Public read endpoints over the Bible corpus.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::{
    BibleBook, BookWithChapters, ChapterWithVerses, Testament, VerseDetail, VerseSearchResult,
};
use crate::AppState;

use super::error::ApiError;
use super::ApiResponse;

const SEARCH_MIN_QUERY_LEN: usize = 3;
const SEARCH_DEFAULT_LIMIT: i64 = 20;
const SEARCH_MAX_LIMIT: i64 = 100;

fn parse_testament(value: Option<&str>) -> Result<Option<Testament>, ApiError> {
    value
        .map(|s| {
            Testament::from_str(s).map_err(|_| {
                ApiError::validation(
                    "testament must be one of: old_testament, new_testament, deuterocanonical",
                )
            })
        })
        .transpose()
}

#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    pub testament: Option<String>,
    pub category: Option<String>,
}

/// GET /api/bible/books
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<ApiResponse<Vec<BibleBook>>>, ApiError> {
    let testament = parse_testament(query.testament.as_deref())?;
    let books = state
        .bible
        .list_books(testament, query.category.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(books)))
}

/// GET /api/bible/books/:id
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BookWithChapters>>, ApiError> {
    let book = state
        .bible
        .get_book_with_chapters(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Book not found"))?;
    Ok(Json(ApiResponse::ok(book)))
}

/// GET /api/bible/chapters/:id
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ChapterWithVerses>>, ApiError> {
    let chapter = state
        .bible
        .get_chapter_with_verses(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chapter not found"))?;
    Ok(Json(ApiResponse::ok(chapter)))
}

/// GET /api/bible/verses/:id
pub async fn get_verse(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<VerseDetail>>, ApiError> {
    let verse = state
        .bible
        .get_verse(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Verse not found"))?;
    Ok(Json(ApiResponse::ok(verse)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub book_id: Option<i32>,
    pub testament: Option<String>,
    pub limit: Option<i64>,
}

fn effective_limit(requested: Option<i64>) -> i64 {
    requested
        .filter(|l| *l >= 1)
        .unwrap_or(SEARCH_DEFAULT_LIMIT)
        .min(SEARCH_MAX_LIMIT)
}

/// GET /api/bible/search
pub async fn search_verses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<VerseSearchResult>>>, ApiError> {
    let q = query.q.as_deref().map(str::trim).unwrap_or("");
    if q.len() < SEARCH_MIN_QUERY_LEN {
        return Err(ApiError::validation(
            "Search query must be at least 3 characters",
        ));
    }

    let testament = parse_testament(query.testament.as_deref())?;
    let limit = effective_limit(query.limit);

    let results = state
        .bible
        .search(q, query.book_id, testament, limit)
        .await?;
    Ok(Json(ApiResponse::ok(results)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit_defaults_and_caps() {
        assert_eq!(effective_limit(None), 20);
        assert_eq!(effective_limit(Some(0)), 20);
        assert_eq!(effective_limit(Some(-1)), 20);
        assert_eq!(effective_limit(Some(50)), 50);
        assert_eq!(effective_limit(Some(500)), 100);
    }

    #[test]
    fn test_parse_testament() {
        assert_eq!(parse_testament(None).unwrap(), None);
        assert_eq!(
            parse_testament(Some("old_testament")).unwrap(),
            Some(Testament::OldTestament)
        );
        assert_eq!(
            parse_testament(Some("new_testament")).unwrap(),
            Some(Testament::NewTestament)
        );
        assert!(parse_testament(Some("apocrypha")).is_err());
    }
}
