//! Album table operations

use anyhow::Result;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::artist_table::{ArtistRow, ARTIST_COLUMNS};
use crate::core::filter::ListingPredicate;
use crate::models::{Album, NewAlbum};

/// Album columns under `album_*` aliases
pub(crate) const ALBUM_COLUMNS: &str = "al.id AS album_id, al.name AS album_name, \
     al.release_year AS album_release_year, al.cover_image AS album_cover_image, \
     al.is_published AS album_is_published";

/// Album rows always come joined with their artist
pub(crate) const ALBUM_JOIN: &str = "album al JOIN artist ar ON ar.id = al.artist_id";

#[derive(Debug, FromRow)]
pub(crate) struct AlbumRow {
    album_id: i64,
    album_name: String,
    album_release_year: i32,
    album_cover_image: Option<String>,
    album_is_published: bool,
    #[sqlx(flatten)]
    artist: ArtistRow,
}

impl AlbumRow {
    pub(crate) fn into_album(self) -> Album {
        Album {
            id: self.album_id,
            name: self.album_name,
            artist: self.artist.into_artist(),
            release_year: self.album_release_year,
            cover_image: self.album_cover_image,
            is_published: self.album_is_published,
        }
    }
}

fn select() -> String {
    format!("SELECT {}, {} FROM {}", ALBUM_COLUMNS, ARTIST_COLUMNS, ALBUM_JOIN)
}

/// Album table operations
pub struct AlbumTable;

impl AlbumTable {
    /// Albums matching the predicate, most recent release first
    pub async fn find(pool: &SqlitePool, predicate: &ListingPredicate) -> Result<Vec<Album>> {
        let mut qb = QueryBuilder::<Sqlite>::new(select());
        predicate.push_where(&mut qb, "al.is_published", "al.artist_id");
        qb.push(" ORDER BY al.release_year DESC, al.id DESC");

        let rows: Vec<AlbumRow> = qb.build_query_as().fetch_all(pool).await?;

        Ok(rows.into_iter().map(AlbumRow::into_album).collect())
    }

    /// Get album by ID with its artist expanded
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Album>> {
        let row: Option<AlbumRow> = sqlx::query_as(&format!("{} WHERE al.id = ?", select()))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(AlbumRow::into_album))
    }

    pub async fn exists(pool: &SqlitePool, id: i64) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM album WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(found.is_some())
    }

    /// Insert an album, unpublished
    pub async fn insert(pool: &SqlitePool, album: &NewAlbum) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO album (name, artist_id, release_year, cover_image) VALUES (?, ?, ?, ?)",
        )
        .bind(&album.name)
        .bind(album.artist_id)
        .bind(album.release_year)
        .bind(&album.cover_image)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Delete an album (its tracks go with it)
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM album WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip `is_published` in place and return the updated album
    pub async fn toggle_published(pool: &SqlitePool, id: i64) -> Result<Option<Album>> {
        let result = sqlx::query("UPDATE album SET is_published = 1 - is_published WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::get_by_id(pool, id).await
    }
}
