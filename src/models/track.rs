//! Track model

use serde::{Deserialize, Serialize};

use super::{Album, Entity, Publishable};

/// A track with its album (and the album's artist) expanded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: i64,
    pub name: String,
    pub album: Album,
    /// Human readable length, e.g. `3:45`
    pub duration: String,
    /// Position within the album, starting at 1
    pub track_number: i32,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone)]
pub struct NewTrack {
    pub name: String,
    pub album_id: i64,
    pub duration: String,
    /// Next free number in the album when absent
    pub track_number: Option<i32>,
}

impl Entity for Track {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Publishable for Track {
    fn is_published(&self) -> bool {
        self.is_published
    }
}
