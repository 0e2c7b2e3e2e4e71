//! Listening history entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, Track};

/// One play of a track by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackHistory {
    pub id: i64,
    /// Owning user id
    pub user: i64,
    pub track: Track,
    pub datetime: DateTime<Utc>,
}

impl Entity for TrackHistory {
    fn id(&self) -> i64 {
        self.id
    }
}
