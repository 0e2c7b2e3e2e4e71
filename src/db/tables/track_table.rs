//! Track table operations

use anyhow::Result;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::album_table::{AlbumRow, ALBUM_COLUMNS};
use super::artist_table::ARTIST_COLUMNS;
use crate::core::filter::ListingPredicate;
use crate::models::{NewTrack, Track};

pub(crate) const TRACK_COLUMNS: &str = "t.id AS track_id, t.name AS track_name, \
     t.duration AS track_duration, t.track_number AS track_number, \
     t.is_published AS track_is_published";

/// Joins expanding `t` into its album and artist
pub(crate) const TRACK_PARENT_JOINS: &str = "JOIN album al ON al.id = t.album_id \
     JOIN artist ar ON ar.id = al.artist_id";

#[derive(Debug, FromRow)]
pub(crate) struct TrackRow {
    track_id: i64,
    track_name: String,
    track_duration: String,
    track_number: i32,
    track_is_published: bool,
    #[sqlx(flatten)]
    album: AlbumRow,
}

impl TrackRow {
    pub(crate) fn into_track(self) -> Track {
        Track {
            id: self.track_id,
            name: self.track_name,
            album: self.album.into_album(),
            duration: self.track_duration,
            track_number: self.track_number,
            is_published: self.track_is_published,
        }
    }
}

pub(crate) fn select_columns() -> String {
    format!("{}, {}, {}", TRACK_COLUMNS, ALBUM_COLUMNS, ARTIST_COLUMNS)
}

fn select() -> String {
    format!("SELECT {} FROM track t {}", select_columns(), TRACK_PARENT_JOINS)
}

/// Track table operations
pub struct TrackTable;

impl TrackTable {
    /// Tracks matching the predicate in album running order
    pub async fn find(pool: &SqlitePool, predicate: &ListingPredicate) -> Result<Vec<Track>> {
        let mut qb = QueryBuilder::<Sqlite>::new(select());
        predicate.push_where(&mut qb, "t.is_published", "t.album_id");
        qb.push(" ORDER BY t.album_id, t.track_number, t.id");

        let rows: Vec<TrackRow> = qb.build_query_as().fetch_all(pool).await?;

        Ok(rows.into_iter().map(TrackRow::into_track).collect())
    }

    /// Get track by ID with album and artist expanded
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Track>> {
        let row: Option<TrackRow> = sqlx::query_as(&format!("{} WHERE t.id = ?", select()))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TrackRow::into_track))
    }

    /// Insert a track, unpublished. A missing number appends to the album.
    pub async fn insert(pool: &SqlitePool, track: &NewTrack) -> Result<i64> {
        let track_number = match track.track_number {
            Some(n) => n,
            None => {
                let next: i32 = sqlx::query_scalar(
                    "SELECT COALESCE(MAX(track_number), 0) + 1 FROM track WHERE album_id = ?",
                )
                .bind(track.album_id)
                .fetch_one(pool)
                .await?;
                next
            }
        };

        let result = sqlx::query(
            "INSERT INTO track (name, album_id, duration, track_number) VALUES (?, ?, ?, ?)",
        )
        .bind(&track.name)
        .bind(track.album_id)
        .bind(&track.duration)
        .bind(track_number)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Delete a track
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM track WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip `is_published` in place and return the updated track
    pub async fn toggle_published(pool: &SqlitePool, id: i64) -> Result<Option<Track>> {
        let result = sqlx::query("UPDATE track SET is_published = 1 - is_published WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::get_by_id(pool, id).await
    }
}
