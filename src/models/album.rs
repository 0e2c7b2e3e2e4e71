//! Album model

use serde::{Deserialize, Serialize};

use super::{Artist, Entity, Publishable};

/// An album with its artist expanded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: i64,
    pub name: String,
    pub artist: Artist,
    pub release_year: i32,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone)]
pub struct NewAlbum {
    pub name: String,
    /// Must reference an existing artist
    pub artist_id: i64,
    pub release_year: i32,
    pub cover_image: Option<String>,
}

impl Entity for Album {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Publishable for Album {
    fn is_published(&self) -> bool {
        self.is_published
    }
}
