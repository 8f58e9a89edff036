//! Bible corpus models (read-only at runtime).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "bible_testament", rename_all = "snake_case")]
pub enum Testament {
    OldTestament,
    NewTestament,
    Deuterocanonical,
}

impl std::str::FromStr for Testament {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "old_testament" => Ok(Testament::OldTestament),
            "new_testament" => Ok(Testament::NewTestament),
            "deuterocanonical" => Ok(Testament::Deuterocanonical),
            _ => Err(format!("Unknown testament: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BibleBook {
    pub id: i32,
    pub book_number: i32,
    pub name_indonesian: String,
    pub name_english: String,
    pub abbreviation: String,
    pub testament: Testament,
    pub category: String,
    pub total_chapters: i32,
    pub author: Option<String>,
    pub writing_period: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact book reference used inside chapter/verse responses.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BibleBookSummary {
    pub id: i32,
    pub name_indonesian: String,
    pub name_english: String,
    pub abbreviation: String,
    pub testament: Testament,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BibleChapter {
    pub id: i32,
    pub book_id: i32,
    pub chapter_number: i32,
    pub total_verses: i32,
    pub summary: Option<String>,
}

/// Chapter line in the book detail view.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BibleChapterSummary {
    pub id: i32,
    pub chapter_number: i32,
    pub total_verses: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BibleVerse {
    pub id: i32,
    pub chapter_id: i32,
    pub verse_number: i32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BibleFootnote {
    pub id: i32,
    pub verse_id: i32,
    pub footnote_number: i32,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookWithChapters {
    #[serde(flatten)]
    pub book: BibleBook,
    pub chapters: Vec<BibleChapterSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseWithFootnotes {
    #[serde(flatten)]
    pub verse: BibleVerse,
    pub footnotes: Vec<BibleFootnote>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterWithVerses {
    #[serde(flatten)]
    pub chapter: BibleChapter,
    pub book: BibleBookSummary,
    pub verses: Vec<VerseWithFootnotes>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseDetail {
    #[serde(flatten)]
    pub verse: BibleVerse,
    pub book: BibleBookSummary,
    pub chapter_number: i32,
    pub footnotes: Vec<BibleFootnote>,
}

/// One hit from verse search, with a human-readable reference like
/// "Mat 5:3".
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseSearchResult {
    pub verse: BibleVerse,
    pub chapter: BibleChapterSummary,
    pub book: BibleBookSummary,
    pub reference: String,
}
