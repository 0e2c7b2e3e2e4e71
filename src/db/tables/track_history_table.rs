//! Track history table operations

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{FromRow, SqlitePool};

use super::track_table::{select_columns, TrackRow, TRACK_PARENT_JOINS};
use crate::models::TrackHistory;

#[derive(Debug, FromRow)]
struct TrackHistoryRow {
    history_id: i64,
    history_user_id: i64,
    history_datetime: String,
    #[sqlx(flatten)]
    track: TrackRow,
}

impl TrackHistoryRow {
    fn into_entry(self) -> Result<TrackHistory> {
        let datetime = DateTime::parse_from_rfc3339(&self.history_datetime)
            .with_context(|| format!("Bad datetime in history row {}", self.history_id))?
            .with_timezone(&Utc);

        Ok(TrackHistory {
            id: self.history_id,
            user: self.history_user_id,
            track: self.track.into_track(),
            datetime,
        })
    }
}

fn select() -> String {
    format!(
        "SELECT h.id AS history_id, h.user_id AS history_user_id, \
         h.datetime AS history_datetime, {} \
         FROM track_history h JOIN track t ON t.id = h.track_id {}",
        select_columns(),
        TRACK_PARENT_JOINS
    )
}

/// Track history table operations
pub struct TrackHistoryTable;

impl TrackHistoryTable {
    /// Record a play
    pub async fn insert(
        pool: &SqlitePool,
        user_id: i64,
        track_id: i64,
        datetime: DateTime<Utc>,
    ) -> Result<i64> {
        // fixed-width UTC stamps sort lexicographically
        let stamp = datetime.to_rfc3339_opts(SecondsFormat::Micros, true);

        let result =
            sqlx::query("INSERT INTO track_history (user_id, track_id, datetime) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(track_id)
                .bind(stamp)
                .execute(pool)
                .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<TrackHistory>> {
        let row: Option<TrackHistoryRow> = sqlx::query_as(&format!("{} WHERE h.id = ?", select()))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        row.map(TrackHistoryRow::into_entry).transpose()
    }

    /// A user's plays, newest first
    pub async fn for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<TrackHistory>> {
        let rows: Vec<TrackHistoryRow> = sqlx::query_as(&format!(
            "{} WHERE h.user_id = ? ORDER BY h.datetime DESC, h.id DESC",
            select()
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(TrackHistoryRow::into_entry).collect()
    }
}
