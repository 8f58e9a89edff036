//! Input validation for API requests.
//!
//! Request DTOs arrive with loosely-typed fields; these functions check
//! them against the schema and hand the stores fully-typed inputs.
//! Validation failures never reach the store layer.

use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;

use crate::db::{
    CategoryUpdate, ContentStatus, ContentType, ContentUpdate, CreateCategoryRequest,
    CreateContentRequest, LoginRequest, NewCategory, NewContent, UpdateCategoryRequest,
    UpdateContentRequest,
};

use super::error::ApiError;

lazy_static! {
    /// Pragmatic email shape check, not an RFC 5322 parser.
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;

/// Parse `page`/`limit` query values. Absent or non-numeric values fall
/// back to the defaults; zero and negatives are treated as absent.
pub fn parse_pagination(page: Option<&str>, limit: Option<&str>) -> (i64, i64) {
    let page = page
        .and_then(|p| p.parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(DEFAULT_PAGE);
    let limit = limit
        .and_then(|l| l.parse::<i64>().ok())
        .filter(|l| *l >= 1)
        .unwrap_or(DEFAULT_LIMIT);
    (page, limit)
}

pub fn validate_login_request(req: &LoginRequest) -> Result<(&str, &str), ApiError> {
    let email = req
        .email
        .as_deref()
        .ok_or_else(|| ApiError::validation("Email is required"))?;
    if !EMAIL_REGEX.is_match(email) {
        return Err(ApiError::validation("Invalid email format"));
    }

    let password = req
        .password
        .as_deref()
        .ok_or_else(|| ApiError::validation("Password is required"))?;
    if password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }

    Ok((email, password))
}

fn validate_category_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("Category name is required"));
    }
    if name.len() > 100 {
        return Err(ApiError::validation(
            "Category name is too long (max 100 characters)",
        ));
    }
    Ok(())
}

pub fn validate_new_category(req: CreateCategoryRequest) -> Result<NewCategory, ApiError> {
    let name = req
        .name
        .ok_or_else(|| ApiError::validation("Category name is required"))?;
    validate_category_name(&name)?;

    Ok(NewCategory {
        name,
        description: req.description,
        parent_id: req.parent_id,
        display_order: req.display_order.unwrap_or(0),
    })
}

pub fn validate_category_update(req: UpdateCategoryRequest) -> Result<CategoryUpdate, ApiError> {
    if let Some(name) = &req.name {
        validate_category_name(name)?;
    }

    Ok(CategoryUpdate {
        name: req.name,
        description: req.description,
        parent_id: req.parent_id,
        display_order: req.display_order,
    })
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if title.len() > 500 {
        return Err(ApiError::validation(
            "Title is too long (max 500 characters)",
        ));
    }
    Ok(())
}

fn parse_content_type(value: &str) -> Result<ContentType, ApiError> {
    ContentType::from_str(value).map_err(|_| {
        ApiError::validation(
            "contentType must be one of: article, document, prayer, homily, qa, page",
        )
    })
}

fn parse_content_status(value: &str) -> Result<ContentStatus, ApiError> {
    ContentStatus::from_str(value).map_err(|_| {
        ApiError::validation("status must be one of: draft, published, archived")
    })
}

fn validate_image_url(url: &Option<String>) -> Result<(), ApiError> {
    if let Some(url) = url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ApiError::validation("featuredImageUrl must be a valid URL"));
        }
    }
    Ok(())
}

fn validate_meta_title(meta_title: &Option<String>) -> Result<(), ApiError> {
    if let Some(m) = meta_title {
        if m.len() > 255 {
            return Err(ApiError::validation(
                "metaTitle is too long (max 255 characters)",
            ));
        }
    }
    Ok(())
}

pub fn validate_new_content(req: CreateContentRequest) -> Result<NewContent, ApiError> {
    let title = req
        .title
        .ok_or_else(|| ApiError::validation("Title is required"))?;
    validate_title(&title)?;

    let body = req
        .body
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::validation("Body is required"))?;

    let content_type = req
        .content_type
        .as_deref()
        .ok_or_else(|| ApiError::validation("contentType is required"))
        .and_then(parse_content_type)?;

    let status = match req.status.as_deref() {
        Some(s) => parse_content_status(s)?,
        None => ContentStatus::Draft,
    };

    validate_image_url(&req.featured_image_url)?;
    validate_meta_title(&req.meta_title)?;

    Ok(NewContent {
        title,
        excerpt: req.excerpt,
        body,
        content_type,
        status,
        category_id: req.category_id,
        featured_image_url: req.featured_image_url,
        meta_title: req.meta_title,
        meta_description: req.meta_description,
    })
}

pub fn validate_content_update(req: UpdateContentRequest) -> Result<ContentUpdate, ApiError> {
    if let Some(title) = &req.title {
        validate_title(title)?;
    }
    if let Some(body) = &req.body {
        if body.is_empty() {
            return Err(ApiError::validation("Body cannot be empty"));
        }
    }

    let content_type = req
        .content_type
        .as_deref()
        .map(parse_content_type)
        .transpose()?;
    let status = req
        .status
        .as_deref()
        .map(parse_content_status)
        .transpose()?;

    validate_image_url(&req.featured_image_url)?;
    validate_meta_title(&req.meta_title)?;

    Ok(ContentUpdate {
        title: req.title,
        excerpt: req.excerpt,
        body: req.body,
        content_type,
        status,
        category_id: req.category_id,
        featured_image_url: req.featured_image_url,
        meta_title: req.meta_title,
        meta_description: req.meta_description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pagination_defaults() {
        assert_eq!(parse_pagination(None, None), (1, 20));
        assert_eq!(parse_pagination(Some("abc"), Some("xyz")), (1, 20));
        assert_eq!(parse_pagination(Some("0"), Some("-5")), (1, 20));
        assert_eq!(parse_pagination(Some(""), None), (1, 20));
    }

    #[test]
    fn test_parse_pagination_values() {
        assert_eq!(parse_pagination(Some("2"), Some("50")), (2, 50));
        // No server-side ceiling on limit for the CRUD listings
        assert_eq!(parse_pagination(Some("1"), Some("1000")), (1, 1000));
    }

    #[test]
    fn test_login_validation() {
        let req = LoginRequest {
            email: Some("admin@catholic-platform.com".to_string()),
            password: Some("admin123".to_string()),
        };
        let (email, password) = validate_login_request(&req).unwrap();
        assert_eq!(email, "admin@catholic-platform.com");
        assert_eq!(password, "admin123");
    }

    #[test]
    fn test_login_validation_rejects_bad_input() {
        let req = LoginRequest {
            email: Some("not-an-email".to_string()),
            password: Some("admin123".to_string()),
        };
        assert!(validate_login_request(&req).is_err());

        let req = LoginRequest {
            email: Some("a@b.com".to_string()),
            password: Some("short".to_string()),
        };
        assert!(validate_login_request(&req).is_err());

        let req = LoginRequest {
            email: None,
            password: None,
        };
        assert!(validate_login_request(&req).is_err());
    }

    #[test]
    fn test_new_content_requires_title_body_type() {
        let req = CreateContentRequest {
            title: Some("Doa Bapa Kami".to_string()),
            excerpt: None,
            body: Some("Bapa kami yang ada di surga...".to_string()),
            content_type: Some("prayer".to_string()),
            status: None,
            category_id: None,
            featured_image_url: None,
            meta_title: None,
            meta_description: None,
        };
        let new = validate_new_content(req).unwrap();
        assert_eq!(new.content_type, ContentType::Prayer);
        // Status defaults to draft when absent
        assert_eq!(new.status, ContentStatus::Draft);
    }

    #[test]
    fn test_new_content_rejects_unknown_enum() {
        let req = CreateContentRequest {
            title: Some("T".to_string()),
            excerpt: None,
            body: Some("B".to_string()),
            content_type: Some("video".to_string()),
            status: None,
            category_id: None,
            featured_image_url: None,
            meta_title: None,
            meta_description: None,
        };
        assert!(validate_new_content(req).is_err());
    }

    #[test]
    fn test_new_content_rejects_missing_required() {
        let req = CreateContentRequest {
            title: None,
            excerpt: None,
            body: None,
            content_type: Some("article".to_string()),
            status: None,
            category_id: None,
            featured_image_url: None,
            meta_title: None,
            meta_description: None,
        };
        assert!(validate_new_content(req).is_err());
    }

    #[test]
    fn test_content_update_parses_enums() {
        let req: UpdateContentRequest =
            serde_json::from_str(r#"{"status": "published"}"#).unwrap();
        let update = validate_content_update(req).unwrap();
        assert_eq!(update.status, Some(ContentStatus::Published));
        assert!(update.title.is_none());

        let req: UpdateContentRequest =
            serde_json::from_str(r#"{"status": "pending"}"#).unwrap();
        assert!(validate_content_update(req).is_err());
    }

    #[test]
    fn test_category_name_bounds() {
        let req = CreateCategoryRequest {
            name: Some("Liturgi".to_string()),
            description: None,
            parent_id: None,
            display_order: None,
        };
        let new = validate_new_category(req).unwrap();
        assert_eq!(new.display_order, 0);

        let req = CreateCategoryRequest {
            name: Some("x".repeat(101)),
            description: None,
            parent_id: None,
            display_order: None,
        };
        assert!(validate_new_category(req).is_err());
    }

    #[test]
    fn test_image_url_must_be_http() {
        let mut req: UpdateContentRequest = serde_json::from_str("{}").unwrap();
        req.featured_image_url = Some("ftp://example.com/x.png".to_string());
        assert!(validate_content_update(req).is_err());
    }
}
