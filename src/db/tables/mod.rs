//! Database table operations

mod album_table;
mod artist_table;
mod track_history_table;
mod track_table;
mod user_table;

pub use album_table::AlbumTable;
pub use artist_table::ArtistTable;
pub use track_history_table::TrackHistoryTable;
pub use track_table::TrackTable;
pub use user_table::UserTable;
