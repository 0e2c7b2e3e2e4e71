//! Data models
//!
//! The same types travel over the wire in both directions: the server
//! serializes them and the client state layer deserializes them.

mod album;
mod artist;
mod track;
mod track_history;
mod user;

pub use album::{Album, NewAlbum};
pub use artist::{Artist, NewArtist};
pub use track::{NewTrack, Track};
pub use track_history::TrackHistory;
pub use user::{Session, User, UserRole};

/// Anything stored with a numeric id
pub trait Entity {
    fn id(&self) -> i64;
}

/// Catalog entities carrying a publication flag
pub trait Publishable: Entity {
    fn is_published(&self) -> bool;
}
