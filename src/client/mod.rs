//! Typed client state layer
//!
//! `ApiClient` talks HTTP, `thunks` wrap one endpoint each, and the
//! `Dispatcher` feeds their lifecycle into the `RootState` store. `routes`
//! decides what a session may open and which controls it sees.

pub mod dispatch;
pub mod gateway;
pub mod routes;
pub mod store;
pub mod thunks;

pub use dispatch::Dispatcher;
pub use gateway::{ApiClient, ClientError, ImageUpload, MessageResponse};
pub use routes::{navigate, Access, Controls, Navigation, Route, ROUTES};
pub use store::{Action, FeatureState, Payload, RequestKind, RootAction, RootState, Status};
pub use thunks::{AlbumForm, ArtistForm, RegisterForm, TrackForm};
