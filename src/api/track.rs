//! Track API routes

use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::auth::{auth_user_optional, require_admin, require_user};
use super::parse_id;
use crate::core::filter::{build_predicate, AlbumById, CallerRole};
use crate::db::tables::{AlbumTable, TrackTable};
use crate::errors::{ApiError, OrInternal};
use crate::models::NewTrack;
use crate::state::AppState;

const NOT_FOUND: &str = "Track not found";

#[derive(Debug, Deserialize)]
pub struct TrackListQuery {
    /// Album id
    pub album: Option<String>,
}

/// Body for track creation; presence is checked by the handler
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrackBody {
    pub name: Option<String>,
    pub album: Option<i64>,
    pub duration: Option<String>,
    pub track_number: Option<i32>,
}

/// List tracks in album running order
#[get("")]
pub async fn list_tracks(
    req: HttpRequest,
    query: web::Query<TrackListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    const FAILURE: &str = "Error fetching tracks";
    let pool = state.db.pool();

    let user = auth_user_optional(&req, &state).await?;
    let predicate = build_predicate(
        CallerRole::of(user.as_ref()),
        query.album.as_deref(),
        &AlbumById(pool),
    )
    .await
    .map_err(|e| e.into_api(FAILURE))?;

    let tracks = TrackTable::find(pool, &predicate).await.or_internal(FAILURE)?;

    Ok(HttpResponse::Ok().json(tracks))
}

#[get("/{id}")]
pub async fn get_track(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path, NOT_FOUND)?;

    let Some(track) = TrackTable::get_by_id(state.db.pool(), id)
        .await
        .or_internal("Error fetching track")?
    else {
        return Err(ApiError::NotFound(NOT_FOUND));
    };

    Ok(HttpResponse::Ok().json(track))
}

#[post("/new_track")]
pub async fn create_track(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateTrackBody>,
) -> Result<HttpResponse, ApiError> {
    const FAILURE: &str = "Error creating track";
    require_user(&req, &state).await?;
    let pool = state.db.pool();

    let body = body.into_inner();
    let name = body.name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let duration = body
        .duration
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let (Some(name), Some(album_id), Some(duration)) = (name, body.album, duration) else {
        return Err(ApiError::validation("Name, album, and duration are required"));
    };

    if matches!(body.track_number, Some(n) if n < 1) {
        return Err(ApiError::validation("Track number must be positive"));
    }

    if !AlbumTable::exists(pool, album_id).await.or_internal(FAILURE)? {
        return Err(ApiError::NotFound("Album not found"));
    }

    let new_track = NewTrack {
        name,
        album_id,
        duration,
        track_number: body.track_number,
    };

    let id = TrackTable::insert(pool, &new_track).await.or_internal(FAILURE)?;
    let track = TrackTable::get_by_id(pool, id)
        .await
        .or_internal(FAILURE)?
        .ok_or(ApiError::Internal(FAILURE))?;

    tracing::info!("Created track {} '{}'", track.id, track.name);
    Ok(HttpResponse::Created().json(track))
}

#[delete("/{id}")]
pub async fn delete_track(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &state).await?;
    let id = parse_id(&path, NOT_FOUND)?;

    if !TrackTable::delete(state.db.pool(), id)
        .await
        .or_internal("Error deleting track")?
    {
        return Err(ApiError::NotFound(NOT_FOUND));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Track deleted successfully"
    })))
}

#[patch("/{id}/togglePublished")]
pub async fn toggle_track_published(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &state).await?;
    let id = parse_id(&path, NOT_FOUND)?;

    let track = TrackTable::toggle_published(state.db.pool(), id)
        .await
        .or_internal("Error toggling track publication")?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(track))
}

/// Configure track routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_tracks)
        .service(create_track)
        .service(get_track)
        .service(delete_track)
        .service(toggle_track_published);
}
