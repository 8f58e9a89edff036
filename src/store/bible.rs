//! Read-only queries over the imported Bible corpus.

use sqlx::{PgPool, Postgres, QueryBuilder};

use super::StoreError;
use crate::db::{
    BibleBook, BibleBookSummary, BibleChapter, BibleChapterSummary, BibleFootnote, BibleVerse,
    BookWithChapters, ChapterWithVerses, Testament, VerseDetail, VerseSearchResult,
    VerseWithFootnotes,
};

#[derive(Clone)]
pub struct BibleStore {
    pool: PgPool,
}

impl BibleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All books in canonical order, optionally filtered by testament
    /// and/or category.
    pub async fn list_books(
        &self,
        testament: Option<Testament>,
        category: Option<&str>,
    ) -> Result<Vec<BibleBook>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM bible_books WHERE TRUE");
        if let Some(testament) = testament {
            qb.push(" AND testament = ").push_bind(testament);
        }
        if let Some(category) = category {
            qb.push(" AND category = ").push_bind(category);
        }
        qb.push(" ORDER BY book_number ASC");

        let books = qb.build_query_as::<BibleBook>().fetch_all(&self.pool).await?;
        Ok(books)
    }

    pub async fn get_book_with_chapters(
        &self,
        id: i32,
    ) -> Result<Option<BookWithChapters>, StoreError> {
        let book = sqlx::query_as::<_, BibleBook>("SELECT * FROM bible_books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(book) = book else {
            return Ok(None);
        };

        let chapters = sqlx::query_as::<_, BibleChapterSummary>(
            r#"
            SELECT id, chapter_number, total_verses
            FROM bible_chapters WHERE book_id = $1
            ORDER BY chapter_number ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(BookWithChapters { book, chapters }))
    }

    pub async fn get_chapter_with_verses(
        &self,
        id: i32,
    ) -> Result<Option<ChapterWithVerses>, StoreError> {
        let chapter = sqlx::query_as::<_, BibleChapter>(
            "SELECT id, book_id, chapter_number, total_verses, summary FROM bible_chapters WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(chapter) = chapter else {
            return Ok(None);
        };

        let book = sqlx::query_as::<_, BibleBookSummary>(
            r#"
            SELECT id, name_indonesian, name_english, abbreviation, testament
            FROM bible_books WHERE id = $1
            "#,
        )
        .bind(chapter.book_id)
        .fetch_one(&self.pool)
        .await?;

        let verses = sqlx::query_as::<_, BibleVerse>(
            r#"
            SELECT id, chapter_id, verse_number, text
            FROM bible_verses WHERE chapter_id = $1
            ORDER BY verse_number ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut with_footnotes = Vec::with_capacity(verses.len());
        for verse in verses {
            let footnotes = self.footnotes_for(verse.id).await?;
            with_footnotes.push(VerseWithFootnotes { verse, footnotes });
        }

        Ok(Some(ChapterWithVerses {
            chapter,
            book,
            verses: with_footnotes,
        }))
    }

    pub async fn get_verse(&self, id: i32) -> Result<Option<VerseDetail>, StoreError> {
        let verse = sqlx::query_as::<_, BibleVerse>(
            "SELECT id, chapter_id, verse_number, text FROM bible_verses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(verse) = verse else {
            return Ok(None);
        };

        let (book_id, chapter_number): (i32, i32) = sqlx::query_as(
            "SELECT book_id, chapter_number FROM bible_chapters WHERE id = $1",
        )
        .bind(verse.chapter_id)
        .fetch_one(&self.pool)
        .await?;

        let book = sqlx::query_as::<_, BibleBookSummary>(
            r#"
            SELECT id, name_indonesian, name_english, abbreviation, testament
            FROM bible_books WHERE id = $1
            "#,
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        let footnotes = self.footnotes_for(verse.id).await?;

        Ok(Some(VerseDetail {
            verse,
            book,
            chapter_number,
            footnotes,
        }))
    }

    /// Case-insensitive substring search over verse text, optionally
    /// narrowed to one book or testament. The caller caps the limit.
    pub async fn search(
        &self,
        query: &str,
        book_id: Option<i32>,
        testament: Option<Testament>,
        limit: i64,
    ) -> Result<Vec<VerseSearchResult>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT v.id, v.chapter_id, v.verse_number, v.text,
                   c.id AS c_id, c.chapter_number, c.total_verses,
                   b.id AS b_id, b.name_indonesian, b.name_english, b.abbreviation, b.testament
            FROM bible_verses v
            JOIN bible_chapters c ON v.chapter_id = c.id
            JOIN bible_books b ON c.book_id = b.id
            WHERE v.text ILIKE
            "#,
        );
        qb.push_bind(format!("%{}%", query));
        if let Some(book_id) = book_id {
            qb.push(" AND b.id = ").push_bind(book_id);
        }
        if let Some(testament) = testament {
            qb.push(" AND b.testament = ").push_bind(testament);
        }
        qb.push(" ORDER BY b.book_number ASC, c.chapter_number ASC, v.verse_number ASC LIMIT ")
            .push_bind(limit);

        let rows = qb.build_query_as::<SearchRow>().fetch_all(&self.pool).await?;

        let results = rows
            .into_iter()
            .map(|row| {
                let reference =
                    format!("{} {}:{}", row.abbreviation, row.chapter_number, row.verse_number);
                VerseSearchResult {
                    verse: BibleVerse {
                        id: row.id,
                        chapter_id: row.chapter_id,
                        verse_number: row.verse_number,
                        text: row.text,
                    },
                    chapter: BibleChapterSummary {
                        id: row.c_id,
                        chapter_number: row.chapter_number,
                        total_verses: row.total_verses,
                    },
                    book: BibleBookSummary {
                        id: row.b_id,
                        name_indonesian: row.name_indonesian,
                        name_english: row.name_english,
                        abbreviation: row.abbreviation.clone(),
                        testament: row.testament,
                    },
                    reference,
                }
            })
            .collect();

        Ok(results)
    }

    async fn footnotes_for(&self, verse_id: i32) -> Result<Vec<BibleFootnote>, StoreError> {
        let footnotes = sqlx::query_as::<_, BibleFootnote>(
            r#"
            SELECT id, verse_id, footnote_number, text
            FROM bible_footnotes WHERE verse_id = $1
            ORDER BY footnote_number ASC
            "#,
        )
        .bind(verse_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(footnotes)
    }
}

/// Flattened join row for verse search.
#[derive(sqlx::FromRow)]
struct SearchRow {
    id: i32,
    chapter_id: i32,
    verse_number: i32,
    text: String,
    c_id: i32,
    chapter_number: i32,
    total_verses: i32,
    b_id: i32,
    name_indonesian: String,
    name_english: String,
    abbreviation: String,
    testament: Testament,
}
