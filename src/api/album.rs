//! Album API routes

use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::auth::{auth_user_optional, require_admin, require_user};
use super::form::FormData;
use super::{parse_id, store_upload};
use crate::core::filter::{build_predicate, ArtistByName, CallerRole};
use crate::core::uploads::remove_image;
use crate::db::tables::{AlbumTable, ArtistTable};
use crate::errors::{ApiError, OrInternal};
use crate::models::NewAlbum;
use crate::state::AppState;

const NOT_FOUND: &str = "Album not found";

/// Query parameters for album list
#[derive(Debug, Deserialize)]
pub struct AlbumListQuery {
    /// Artist name
    pub artist: Option<String>,
}

/// List albums, optionally for one artist
#[get("")]
pub async fn list_albums(
    req: HttpRequest,
    query: web::Query<AlbumListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    const FAILURE: &str = "Error fetching albums";
    let pool = state.db.pool();

    let user = auth_user_optional(&req, &state).await?;
    let predicate = build_predicate(
        CallerRole::of(user.as_ref()),
        query.artist.as_deref(),
        &ArtistByName(pool),
    )
    .await
    .map_err(|e| e.into_api(FAILURE))?;

    let albums = AlbumTable::find(pool, &predicate).await.or_internal(FAILURE)?;

    Ok(HttpResponse::Ok().json(albums))
}

#[get("/{id}")]
pub async fn get_album(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path, NOT_FOUND)?;

    let Some(album) = AlbumTable::get_by_id(state.db.pool(), id)
        .await
        .or_internal("Error fetching album")?
    else {
        return Err(ApiError::NotFound(NOT_FOUND));
    };

    Ok(HttpResponse::Ok().json(album))
}

/// Create an album (multipart: name, artist, releaseYear, coverImage)
#[post("/new_album")]
pub async fn create_album(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    const FAILURE: &str = "Error creating album";
    require_user(&req, &state).await?;
    let pool = state.db.pool();

    let mut form = FormData::read(payload, state.config.max_upload_size).await?;
    let (Some(name), Some(artist), Some(release_year)) = (
        form.text("name"),
        form.text("artist"),
        form.text("releaseYear"),
    ) else {
        return Err(ApiError::validation(
            "Name, artist, and release year are required",
        ));
    };

    let artist_id: i64 = artist
        .parse()
        .map_err(|_| ApiError::validation("Artist must be an artist id"))?;
    let release_year: i32 = release_year
        .parse()
        .map_err(|_| ApiError::validation("Release year must be a number"))?;
    let name = name.to_string();

    if ArtistTable::get_by_id(pool, artist_id)
        .await
        .or_internal(FAILURE)?
        .is_none()
    {
        return Err(ApiError::NotFound("Artist not found"));
    }

    // the image is only written once the fields check out
    let cover_image = store_upload(&state.paths, form.take_file("coverImage"), FAILURE)?;
    let new_album = NewAlbum {
        name,
        artist_id,
        release_year,
        cover_image,
    };

    let id = match AlbumTable::insert(pool, &new_album).await.or_internal(FAILURE) {
        Ok(id) => id,
        Err(e) => {
            if let Some(cover) = &new_album.cover_image {
                remove_image(&state.paths, cover);
            }
            return Err(e);
        }
    };

    let album = AlbumTable::get_by_id(pool, id)
        .await
        .or_internal(FAILURE)?
        .ok_or(ApiError::Internal(FAILURE))?;

    tracing::info!("Created album {} '{}'", album.id, album.name);
    Ok(HttpResponse::Created().json(album))
}

/// Delete an album and its tracks
#[delete("/{id}")]
pub async fn delete_album(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    const FAILURE: &str = "Error deleting album";
    require_admin(&req, &state).await?;

    let id = parse_id(&path, NOT_FOUND)?;
    let pool = state.db.pool();

    let album = AlbumTable::get_by_id(pool, id)
        .await
        .or_internal(FAILURE)?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;

    if !AlbumTable::delete(pool, id).await.or_internal(FAILURE)? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }

    if let Some(cover) = &album.cover_image {
        remove_image(&state.paths, cover);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Album deleted successfully"
    })))
}

#[patch("/{id}/togglePublished")]
pub async fn toggle_album_published(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &state).await?;
    let id = parse_id(&path, NOT_FOUND)?;

    let album = AlbumTable::toggle_published(state.db.pool(), id)
        .await
        .or_internal("Error toggling album publication")?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(album))
}

/// Configure album routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_albums)
        .service(create_album)
        .service(get_album)
        .service(delete_album)
        .service(toggle_album_published);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::form::tests::multipart_body;
    use crate::core::filter::ListingPredicate;
    use crate::core::uploads::tests::PNG_BYTES;
    use crate::models::{Album, UserRole};
    use crate::testing::{bearer, create_user, init_app, seed_album, seed_artist, TestApp};
    use actix_web::http::{header, StatusCode};
    use actix_web::test;

    const BOUNDARY: &str = "albumboundary";

    fn new_album_request(
        token: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/albums/new_album")
            .insert_header(bearer(token))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body(BOUNDARY, fields, files))
    }

    async fn stored_albums(ctx: &TestApp) -> Vec<Album> {
        AlbumTable::find(ctx.state.db.pool(), &ListingPredicate::default())
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn test_user_sees_published_only() {
        let ctx = TestApp::new().await;
        let (_, user) = create_user(&ctx.state, "user", UserRole::User).await;
        let artist = seed_artist(&ctx.state, "Miles", true).await;
        seed_album(&ctx.state, artist.id, "Kind of Blue", 1959, true).await;
        seed_album(&ctx.state, artist.id, "Outtakes", 1960, false).await;
        let app = init_app!(ctx.state);

        let req = test::TestRequest::get()
            .uri("/albums")
            .insert_header(bearer(&user))
            .to_request();
        let albums: Vec<Album> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name, "Kind of Blue");
        assert_eq!(albums[0].artist.name, "Miles");
    }

    #[actix_web::test]
    async fn test_admin_sees_everything_newest_first() {
        let ctx = TestApp::new().await;
        let (_, admin) = create_user(&ctx.state, "admin", UserRole::Admin).await;
        let artist = seed_artist(&ctx.state, "Miles", false).await;
        seed_album(&ctx.state, artist.id, "Kind of Blue", 1959, true).await;
        seed_album(&ctx.state, artist.id, "Bitches Brew", 1970, false).await;
        let app = init_app!(ctx.state);

        let req = test::TestRequest::get()
            .uri("/albums")
            .insert_header(bearer(&admin))
            .to_request();
        let albums: Vec<Album> = test::call_and_read_body_json(&app, req).await;

        let years: Vec<_> = albums.iter().map(|a| a.release_year).collect();
        assert_eq!(years, vec![1970, 1959]);
    }

    #[actix_web::test]
    async fn test_artist_filter() {
        let ctx = TestApp::new().await;
        let (_, admin) = create_user(&ctx.state, "admin", UserRole::Admin).await;
        let miles = seed_artist(&ctx.state, "Miles Davis", true).await;
        let nina = seed_artist(&ctx.state, "Nina", true).await;
        seed_album(&ctx.state, miles.id, "Kind of Blue", 1959, true).await;
        seed_album(&ctx.state, nina.id, "Pastel Blues", 1965, true).await;
        let app = init_app!(ctx.state);

        let req = test::TestRequest::get()
            .uri("/albums?artist=Miles%20Davis")
            .insert_header(bearer(&admin))
            .to_request();
        let albums: Vec<Album> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].artist.id, miles.id);

        let req = test::TestRequest::get()
            .uri("/albums?artist=Nobody")
            .insert_header(bearer(&admin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Artist not found");
    }

    #[actix_web::test]
    async fn test_anonymous_listing_rejected() {
        let ctx = TestApp::new().await;
        let app = init_app!(ctx.state);

        // rejected before the artist lookup could 404
        let req = test::TestRequest::get().uri("/albums?artist=Nobody").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_get_unknown_ids() {
        let ctx = TestApp::new().await;
        let app = init_app!(ctx.state);

        for uri in ["/albums/999", "/albums/not-a-number"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
    }

    #[actix_web::test]
    async fn test_create_album() {
        let ctx = TestApp::new().await;
        let (_, user) = create_user(&ctx.state, "user", UserRole::User).await;
        let artist = seed_artist(&ctx.state, "Miles", true).await;
        let app = init_app!(ctx.state);

        let artist_id = artist.id.to_string();
        let req = new_album_request(
            &user,
            &[("name", "Sketches"), ("artist", artist_id.as_str()), ("releaseYear", "1960")],
            &[("coverImage", "cover.png", PNG_BYTES)],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let album: Album = test::read_body_json(resp).await;
        assert_eq!(album.artist, artist);
        assert_eq!(album.release_year, 1960);
        assert!(!album.is_published);
        assert!(album.cover_image.unwrap().starts_with("images/"));
    }

    #[actix_web::test]
    async fn test_create_missing_fields_persists_nothing() {
        let ctx = TestApp::new().await;
        let (_, user) = create_user(&ctx.state, "user", UserRole::User).await;
        let artist = seed_artist(&ctx.state, "Miles", true).await;
        let app = init_app!(ctx.state);
        let artist_id = artist.id.to_string();
        let artist_id = artist_id.as_str();

        let cases: Vec<Vec<(&str, &str)>> = vec![
            vec![("artist", artist_id), ("releaseYear", "1960")],
            vec![("name", "Sketches"), ("releaseYear", "1960")],
            vec![("name", "Sketches"), ("artist", artist_id)],
            vec![("name", "Sketches"), ("artist", artist_id), ("releaseYear", "soon")],
        ];

        for fields in cases {
            let req = new_album_request(&user, &fields, &[("coverImage", "c.png", PNG_BYTES)])
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        assert!(stored_albums(&ctx).await.is_empty());
        let images = std::fs::read_dir(ctx.state.paths.images_dir()).unwrap().count();
        assert_eq!(images, 0);
    }

    #[actix_web::test]
    async fn test_create_unknown_artist() {
        let ctx = TestApp::new().await;
        let (_, user) = create_user(&ctx.state, "user", UserRole::User).await;
        let app = init_app!(ctx.state);

        let req = new_album_request(
            &user,
            &[("name", "Orphan"), ("artist", "42"), ("releaseYear", "2000")],
            &[],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(stored_albums(&ctx).await.is_empty());
    }

    #[actix_web::test]
    async fn test_create_requires_session() {
        let ctx = TestApp::new().await;
        let app = init_app!(ctx.state);

        let req = test::TestRequest::post()
            .uri("/albums/new_album")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body(BOUNDARY, &[("name", "x")], &[]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_delete_then_get() {
        let ctx = TestApp::new().await;
        let (_, admin) = create_user(&ctx.state, "admin", UserRole::Admin).await;
        let (_, user) = create_user(&ctx.state, "user", UserRole::User).await;
        let artist = seed_artist(&ctx.state, "Miles", true).await;
        let album = seed_album(&ctx.state, artist.id, "Doomed", 1999, true).await;
        let app = init_app!(ctx.state);
        let uri = format!("/albums/{}", album.id);

        let req = test::TestRequest::delete().uri("/albums/999").insert_header(bearer(&admin)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete().uri(&uri).insert_header(bearer(&user)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::delete().uri(&uri).insert_header(bearer(&admin)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Album deleted successfully");

        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_toggle_published_twice() {
        let ctx = TestApp::new().await;
        let (_, admin) = create_user(&ctx.state, "admin", UserRole::Admin).await;
        let artist = seed_artist(&ctx.state, "Miles", true).await;
        let album = seed_album(&ctx.state, artist.id, "Flip", 1999, false).await;
        let app = init_app!(ctx.state);
        let uri = format!("/albums/{}/togglePublished", album.id);

        let req = test::TestRequest::patch().uri(&uri).insert_header(bearer(&admin)).to_request();
        let once: Album = test::call_and_read_body_json(&app, req).await;
        assert!(once.is_published);

        let req = test::TestRequest::patch().uri(&uri).insert_header(bearer(&admin)).to_request();
        let twice: Album = test::call_and_read_body_json(&app, req).await;
        assert_eq!(twice, album);

        let req = test::TestRequest::patch()
            .uri("/albums/999/togglePublished")
            .insert_header(bearer(&admin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
