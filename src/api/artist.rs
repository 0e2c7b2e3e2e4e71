//! Artist API routes

use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};

use super::auth::{auth_user_optional, require_admin, require_user};
use super::form::FormData;
use super::{parse_id, store_upload};
use crate::core::filter::{scope_for, CallerRole};
use crate::core::uploads::remove_image;
use crate::db::tables::ArtistTable;
use crate::errors::{ApiError, OrInternal};
use crate::models::NewArtist;
use crate::state::AppState;

const NOT_FOUND: &str = "Artist not found";

/// List artists visible to the caller
#[get("")]
pub async fn list_artists(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    const FAILURE: &str = "Error fetching artists";

    let user = auth_user_optional(&req, &state).await?;
    let predicate = scope_for(CallerRole::of(user.as_ref())).map_err(|e| e.into_api(FAILURE))?;

    let artists = ArtistTable::find(state.db.pool(), &predicate)
        .await
        .or_internal(FAILURE)?;

    Ok(HttpResponse::Ok().json(artists))
}

#[get("/{id}")]
pub async fn get_artist(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path, NOT_FOUND)?;

    match ArtistTable::get_by_id(state.db.pool(), id)
        .await
        .or_internal("Error fetching artist")?
    {
        Some(artist) => Ok(HttpResponse::Ok().json(artist)),
        None => Err(ApiError::NotFound(NOT_FOUND)),
    }
}

/// Create an artist (multipart: name, information, photo)
#[post("/new_artist")]
pub async fn create_artist(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    const FAILURE: &str = "Error creating artist";
    require_user(&req, &state).await?;

    let mut form = FormData::read(payload, state.config.max_upload_size).await?;
    let name = form
        .text("name")
        .ok_or_else(|| ApiError::validation("Name is required"))?
        .to_string();
    let information = form.text("information").map(str::to_string);
    let photo = store_upload(&state.paths, form.take_file("photo"), FAILURE)?;

    let new_artist = NewArtist {
        name,
        photo,
        information,
    };

    let pool = state.db.pool();
    let id = match ArtistTable::insert(pool, &new_artist).await.or_internal(FAILURE) {
        Ok(id) => id,
        Err(e) => {
            if let Some(photo) = &new_artist.photo {
                remove_image(&state.paths, photo);
            }
            return Err(e);
        }
    };

    let artist = ArtistTable::get_by_id(pool, id)
        .await
        .or_internal(FAILURE)?
        .ok_or(ApiError::Internal(FAILURE))?;

    tracing::info!("Created artist {} '{}'", artist.id, artist.name);
    Ok(HttpResponse::Created().json(artist))
}

/// Delete an artist together with its albums and tracks
#[delete("/{id}")]
pub async fn delete_artist(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    const FAILURE: &str = "Error deleting artist";
    require_admin(&req, &state).await?;

    let id = parse_id(&path, NOT_FOUND)?;
    let pool = state.db.pool();

    let artist = ArtistTable::get_by_id(pool, id)
        .await
        .or_internal(FAILURE)?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;

    if !ArtistTable::delete(pool, id).await.or_internal(FAILURE)? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }

    if let Some(photo) = &artist.photo {
        remove_image(&state.paths, photo);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Artist deleted successfully"
    })))
}

#[patch("/{id}/togglePublished")]
pub async fn toggle_artist_published(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &state).await?;
    let id = parse_id(&path, NOT_FOUND)?;

    let artist = ArtistTable::toggle_published(state.db.pool(), id)
        .await
        .or_internal("Error toggling artist publication")?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(artist))
}

/// Configure artist routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_artists)
        .service(create_artist)
        .service(get_artist)
        .service(delete_artist)
        .service(toggle_artist_published);
}
