//! Artist model

use serde::{Deserialize, Serialize};

use super::{Entity, Publishable};

/// A catalog artist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Database ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Stored image reference (`images/<file>`)
    #[serde(default)]
    pub photo: Option<String>,
    /// Free-form biography
    #[serde(default)]
    pub information: Option<String>,
    /// Hidden from non-admin listings until published
    #[serde(default)]
    pub is_published: bool,
}

/// Fields accepted when creating an artist
#[derive(Debug, Clone)]
pub struct NewArtist {
    pub name: String,
    pub photo: Option<String>,
    pub information: Option<String>,
}

impl Entity for Artist {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Publishable for Artist {
    fn is_published(&self) -> bool {
        self.is_published
    }
}
