//! One async call per endpoint
//!
//! Each thunk performs exactly one HTTP request and returns the parsed body.
//! Failures are logged and handed back unchanged.

use reqwest::multipart::Form;
use serde_json::json;

use super::gateway::{ApiClient, ClientError, ImageUpload, MessageResponse};
use crate::models::{Album, Artist, Session, Track, TrackHistory, User};

/// Fields of the new-artist form
#[derive(Debug, Clone, Default)]
pub struct ArtistForm {
    pub name: String,
    pub information: Option<String>,
    pub photo: Option<ImageUpload>,
}

/// Fields of the new-album form
#[derive(Debug, Clone)]
pub struct AlbumForm {
    pub name: String,
    pub artist: i64,
    pub release_year: i32,
    pub cover_image: Option<ImageUpload>,
}

/// Fields of the new-track form
#[derive(Debug, Clone)]
pub struct TrackForm {
    pub name: String,
    pub album: i64,
    pub duration: String,
    pub track_number: Option<i32>,
}

/// Fields of the registration form
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub avatar: Option<ImageUpload>,
}

fn logged<T>(what: &str, result: Result<T, ClientError>) -> Result<T, ClientError> {
    if let Err(e) = &result {
        tracing::error!("Error {}: {}", what, e);
    }
    result
}

fn with_image(form: Form, field: &'static str, image: Option<ImageUpload>) -> Form {
    match image {
        Some(image) => form.part(field, image.into_part()),
        None => form,
    }
}

// artists

pub async fn fetch_artists(client: &ApiClient) -> Result<Vec<Artist>, ClientError> {
    logged("fetching artists", client.get("/artists", &[]).await)
}

pub async fn fetch_artist(client: &ApiClient, id: i64) -> Result<Artist, ClientError> {
    logged(
        "fetching artist",
        client.get(&format!("/artists/{}", id), &[]).await,
    )
}

pub async fn create_artist(client: &ApiClient, artist: ArtistForm) -> Result<Artist, ClientError> {
    let mut form = Form::new().text("name", artist.name);
    if let Some(information) = artist.information {
        form = form.text("information", information);
    }
    let form = with_image(form, "photo", artist.photo);

    logged(
        "creating artist",
        client.post_multipart("/artists/new_artist", form).await,
    )
}

pub async fn delete_artist(client: &ApiClient, id: i64) -> Result<MessageResponse, ClientError> {
    logged(
        "deleting artist",
        client.delete(&format!("/artists/{}", id)).await,
    )
}

pub async fn toggle_artist(client: &ApiClient, id: i64) -> Result<Artist, ClientError> {
    logged(
        "toggling artist",
        client
            .patch(&format!("/artists/{}/togglePublished", id))
            .await,
    )
}

// albums

/// All visible albums, or one artist's when a name is given
pub async fn fetch_albums(client: &ApiClient, artist: Option<&str>) -> Result<Vec<Album>, ClientError> {
    let query: Vec<(&str, String)> = artist
        .map(|name| vec![("artist", name.to_string())])
        .unwrap_or_default();

    logged("fetching albums", client.get("/albums", &query).await)
}

pub async fn fetch_album(client: &ApiClient, id: i64) -> Result<Album, ClientError> {
    logged(
        "fetching album",
        client.get(&format!("/albums/{}", id), &[]).await,
    )
}

pub async fn create_album(client: &ApiClient, album: AlbumForm) -> Result<Album, ClientError> {
    let form = Form::new()
        .text("name", album.name)
        .text("artist", album.artist.to_string())
        .text("releaseYear", album.release_year.to_string());
    let form = with_image(form, "coverImage", album.cover_image);

    logged(
        "creating album",
        client.post_multipart("/albums/new_album", form).await,
    )
}

pub async fn delete_album(client: &ApiClient, id: i64) -> Result<MessageResponse, ClientError> {
    logged(
        "deleting album",
        client.delete(&format!("/albums/{}", id)).await,
    )
}

pub async fn toggle_album(client: &ApiClient, id: i64) -> Result<Album, ClientError> {
    logged(
        "toggling album",
        client
            .patch(&format!("/albums/{}/togglePublished", id))
            .await,
    )
}

// tracks

pub async fn fetch_tracks(client: &ApiClient, album: Option<i64>) -> Result<Vec<Track>, ClientError> {
    let query: Vec<(&str, String)> = album
        .map(|id| vec![("album", id.to_string())])
        .unwrap_or_default();

    logged("fetching tracks", client.get("/tracks", &query).await)
}

pub async fn fetch_track(client: &ApiClient, id: i64) -> Result<Track, ClientError> {
    logged(
        "fetching track",
        client.get(&format!("/tracks/{}", id), &[]).await,
    )
}

pub async fn create_track(client: &ApiClient, track: TrackForm) -> Result<Track, ClientError> {
    let body = json!({
        "name": track.name,
        "album": track.album,
        "duration": track.duration,
        "trackNumber": track.track_number,
    });

    logged(
        "creating track",
        client.post_json("/tracks/new_track", &body).await,
    )
}

pub async fn delete_track(client: &ApiClient, id: i64) -> Result<MessageResponse, ClientError> {
    logged(
        "deleting track",
        client.delete(&format!("/tracks/{}", id)).await,
    )
}

pub async fn toggle_track(client: &ApiClient, id: i64) -> Result<Track, ClientError> {
    logged(
        "toggling track",
        client
            .patch(&format!("/tracks/{}/togglePublished", id))
            .await,
    )
}

// users

/// Register and keep the returned token for later calls
pub async fn register(client: &ApiClient, user: RegisterForm) -> Result<User, ClientError> {
    let form = Form::new()
        .text("username", user.username)
        .text("password", user.password)
        .text("displayName", user.display_name);
    let form = with_image(form, "avatar", user.avatar);

    let session: Session = logged("registering", client.post_multipart("/users", form).await)?;
    client.set_token(Some(session.token));
    Ok(session.user)
}

/// Log in and keep the returned token for later calls
pub async fn login(client: &ApiClient, username: &str, password: &str) -> Result<User, ClientError> {
    let body = json!({ "username": username, "password": password });

    let session: Session = logged(
        "logging in",
        client.post_json("/users/sessions", &body).await,
    )?;
    client.set_token(Some(session.token));
    Ok(session.user)
}

/// Log out; the local token is dropped even if the server call fails
pub async fn logout(client: &ApiClient) -> Result<MessageResponse, ClientError> {
    let result = client.delete("/users/sessions").await;
    client.set_token(None);
    logged("logging out", result)
}

pub async fn fetch_me(client: &ApiClient) -> Result<User, ClientError> {
    logged("fetching current user", client.get("/users/me", &[]).await)
}

// track history

pub async fn record_play(client: &ApiClient, track: i64) -> Result<TrackHistory, ClientError> {
    logged(
        "saving track history",
        client
            .post_json("/track_history", &json!({ "track": track }))
            .await,
    )
}

pub async fn fetch_history(client: &ApiClient) -> Result<Vec<TrackHistory>, ClientError> {
    logged(
        "fetching track history",
        client.get("/track_history", &[]).await,
    )
}
