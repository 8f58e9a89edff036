//! Resource stores: each store owns a pool handle and implements the
//! persistence contract for one resource family. Constructed once at
//! startup and shared through `AppState`.

mod bible;
mod categories;
mod contents;
mod sessions;
mod users;

pub use bible::BibleStore;
pub use categories::CategoryStore;
pub use contents::ContentStore;
pub use sessions::SessionStore;
pub use users::UserStore;

use thiserror::Error;

/// Errors surfaced by the stores. The route layer maps these onto HTTP
/// statuses; see `api::error`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    /// Uniqueness violation on a derived slug or name.
    #[error("{0}")]
    Conflict(&'static str),

    /// A referential policy refused the operation (e.g. deleting a
    /// category that still has children).
    #[error("{0}")]
    Policy(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}

/// Derive a URL-safe slug from a human-readable name or title.
///
/// Lowercase, characters outside `[a-z0-9 -]` dropped, whitespace runs
/// collapsed to single hyphens, hyphen runs collapsed, edges trimmed.
/// Deterministic: the same input always yields the same slug.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut prev_hyphen = false;

    for c in input.to_lowercase().chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            prev_hyphen = false;
        } else if c == '-' && !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }

    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Doa Bapa Kami"), "doa-bapa-kami");
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("What is Grace?"), "what-is-grace");
        assert_eq!(slugify("St. Peter's Basilica"), "st-peters-basilica");
    }

    #[test]
    fn test_slugify_collapses_whitespace_and_hyphens() {
        assert_eq!(slugify("a    b"), "a-b");
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("  padded  "), "padded");
    }

    #[test]
    fn test_slugify_trims_edge_hyphens() {
        assert_eq!(slugify("-leading and trailing-"), "leading-and-trailing");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_is_deterministic() {
        let a = slugify("Sacramentum Caritatis (2007)");
        let b = slugify("Sacramentum Caritatis (2007)");
        assert_eq!(a, b);
        assert_eq!(a, "sacramentum-caritatis-2007");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        // Characters outside [a-z0-9] are removed, not transliterated
        assert_eq!(slugify("Café del Mar"), "caf-del-mar");
    }
}
