//! Shared fixtures for handler tests

use tempfile::TempDir;

use crate::config::{Paths, ServerConfig};
use crate::db::tables::{AlbumTable, ArtistTable, TrackTable, UserTable};
use crate::db::DbEngine;
use crate::models::{Album, Artist, NewAlbum, NewArtist, NewTrack, Track, User, UserRole};
use crate::state::AppState;
use crate::utils::auth::{create_jwt, hash_password};

/// Build the full API service around a state
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure($crate::api::configure),
        )
        .await
    };
}

pub(crate) use init_app;

/// In-memory database plus a throwaway config dir
pub(crate) struct TestApp {
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let paths = Paths::new(Some(dir.path().to_path_buf())).unwrap();
        let db = DbEngine::in_memory().await.unwrap();

        let mut config = ServerConfig::default();
        config.ensure_server_id();

        Self {
            state: AppState::new(db, paths, config),
            _dir: dir,
        }
    }
}

/// Insert a user with password `pw` and mint a token for it
pub(crate) async fn create_user(state: &AppState, username: &str, role: UserRole) -> (User, String) {
    let mut user = User::new(username.to_string(), hash_password("pw"), username.to_string());
    user.role = role;
    user.id = UserTable::insert(state.db.pool(), &user).await.unwrap();

    let token = create_jwt(&user, &state.config.server_id, 3600).unwrap();
    (user, token)
}

pub(crate) async fn seed_artist(state: &AppState, name: &str, published: bool) -> Artist {
    let pool = state.db.pool();
    let id = ArtistTable::insert(
        pool,
        &NewArtist {
            name: name.to_string(),
            photo: None,
            information: None,
        },
    )
    .await
    .unwrap();

    if published {
        ArtistTable::toggle_published(pool, id).await.unwrap();
    }
    ArtistTable::get_by_id(pool, id).await.unwrap().unwrap()
}

pub(crate) async fn seed_album(
    state: &AppState,
    artist_id: i64,
    name: &str,
    release_year: i32,
    published: bool,
) -> Album {
    let pool = state.db.pool();
    let id = AlbumTable::insert(
        pool,
        &NewAlbum {
            name: name.to_string(),
            artist_id,
            release_year,
            cover_image: None,
        },
    )
    .await
    .unwrap();

    if published {
        AlbumTable::toggle_published(pool, id).await.unwrap();
    }
    AlbumTable::get_by_id(pool, id).await.unwrap().unwrap()
}

pub(crate) async fn seed_track(state: &AppState, album_id: i64, name: &str, published: bool) -> Track {
    let pool = state.db.pool();
    let id = TrackTable::insert(
        pool,
        &NewTrack {
            name: name.to_string(),
            album_id,
            duration: "3:30".to_string(),
            track_number: None,
        },
    )
    .await
    .unwrap();

    if published {
        TrackTable::toggle_published(pool, id).await.unwrap();
    }
    TrackTable::get_by_id(pool, id).await.unwrap().unwrap()
}

/// `Authorization` header carrying a bearer token
pub(crate) fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", token),
    )
}

/// Serve the API on an ephemeral local port and return its base URL
pub(crate) fn spawn_server(state: &AppState) -> String {
    let state = state.clone();
    let server = actix_web::HttpServer::new(move || {
        actix_web::App::new()
            .app_data(actix_web::web::Data::new(state.clone()))
            .configure(crate::api::configure)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    format!("http://{}", addr)
}
