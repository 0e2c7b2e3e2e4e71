//! Artist table operations

use anyhow::Result;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::core::filter::ListingPredicate;
use crate::models::{Artist, NewArtist};

/// Artist columns under `artist_*` aliases, shared by every join
pub(crate) const ARTIST_COLUMNS: &str = "ar.id AS artist_id, ar.name AS artist_name, \
     ar.photo AS artist_photo, ar.information AS artist_information, \
     ar.is_published AS artist_is_published";

#[derive(Debug, FromRow)]
pub(crate) struct ArtistRow {
    artist_id: i64,
    artist_name: String,
    artist_photo: Option<String>,
    artist_information: Option<String>,
    artist_is_published: bool,
}

impl ArtistRow {
    pub(crate) fn into_artist(self) -> Artist {
        Artist {
            id: self.artist_id,
            name: self.artist_name,
            photo: self.artist_photo,
            information: self.artist_information,
            is_published: self.artist_is_published,
        }
    }
}

/// Artist table operations
pub struct ArtistTable;

impl ArtistTable {
    /// Artists matching the predicate, newest first
    pub async fn find(pool: &SqlitePool, predicate: &ListingPredicate) -> Result<Vec<Artist>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM artist ar", ARTIST_COLUMNS));
        // artists have no parent, so parent_col is never rendered
        predicate.push_where(&mut qb, "ar.is_published", "ar.id");
        qb.push(" ORDER BY ar.id DESC");

        let rows: Vec<ArtistRow> = qb.build_query_as().fetch_all(pool).await?;

        Ok(rows.into_iter().map(ArtistRow::into_artist).collect())
    }

    /// Get artist by ID
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Artist>> {
        let row: Option<ArtistRow> = sqlx::query_as(&format!(
            "SELECT {} FROM artist ar WHERE ar.id = ?",
            ARTIST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(ArtistRow::into_artist))
    }

    /// Resolve an artist name to its id; the oldest artist wins on duplicates
    pub async fn id_by_name(pool: &SqlitePool, name: &str) -> Result<Option<i64>> {
        let id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM artist WHERE name = ? ORDER BY id LIMIT 1")
                .bind(name)
                .fetch_optional(pool)
                .await?;

        Ok(id)
    }

    /// Insert an artist, unpublished
    pub async fn insert(pool: &SqlitePool, artist: &NewArtist) -> Result<i64> {
        let result = sqlx::query("INSERT INTO artist (name, photo, information) VALUES (?, ?, ?)")
            .bind(&artist.name)
            .bind(&artist.photo)
            .bind(&artist.information)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Delete an artist (its albums and tracks go with it)
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM artist WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip `is_published` in place and return the updated artist
    pub async fn toggle_published(pool: &SqlitePool, id: i64) -> Result<Option<Artist>> {
        let result = sqlx::query("UPDATE artist SET is_published = 1 - is_published WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::get_by_id(pool, id).await
    }
}
