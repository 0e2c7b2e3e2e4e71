//! Listening history routes

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use super::auth::require_user;
use crate::db::tables::{TrackHistoryTable, TrackTable};
use crate::errors::{ApiError, OrInternal};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordPlayBody {
    pub track: Option<i64>,
}

/// Record a play of a track by the caller
#[post("")]
pub async fn record_play(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<RecordPlayBody>,
) -> Result<HttpResponse, ApiError> {
    const FAILURE: &str = "Error saving track history";
    let user = require_user(&req, &state).await?;
    let pool = state.db.pool();

    let track_id = body
        .track
        .ok_or_else(|| ApiError::validation("Track is required"))?;

    if TrackTable::get_by_id(pool, track_id)
        .await
        .or_internal(FAILURE)?
        .is_none()
    {
        return Err(ApiError::NotFound("Track not found"));
    }

    let id = TrackHistoryTable::insert(pool, user.id, track_id, Utc::now())
        .await
        .or_internal(FAILURE)?;
    let entry = TrackHistoryTable::get_by_id(pool, id)
        .await
        .or_internal(FAILURE)?
        .ok_or(ApiError::Internal(FAILURE))?;

    Ok(HttpResponse::Created().json(entry))
}

/// The caller's history, newest first
#[get("")]
pub async fn list_history(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req, &state).await?;

    let entries = TrackHistoryTable::for_user(state.db.pool(), user.id)
        .await
        .or_internal("Error fetching track history")?;

    Ok(HttpResponse::Ok().json(entries))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(record_play).service(list_history);
}

#[cfg(test)]
mod tests {
    use crate::models::{TrackHistory, UserRole};
    use crate::testing::{bearer, create_user, init_app, seed_album, seed_artist, seed_track, TestApp};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    #[actix_web::test]
    async fn test_history_is_per_user_newest_first() {
        let ctx = TestApp::new().await;
        let (alice, alice_token) = create_user(&ctx.state, "alice", UserRole::User).await;
        let (_, bob_token) = create_user(&ctx.state, "bob", UserRole::User).await;
        let artist = seed_artist(&ctx.state, "Miles", true).await;
        let album = seed_album(&ctx.state, artist.id, "Kind of Blue", 1959, true).await;
        let first = seed_track(&ctx.state, album.id, "So What", true).await;
        let second = seed_track(&ctx.state, album.id, "Blue in Green", true).await;
        let app = init_app!(ctx.state);

        for track in [&first, &second] {
            let req = test::TestRequest::post()
                .uri("/track_history")
                .insert_header(bearer(&alice_token))
                .set_json(json!({ "track": track.id }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);

            let entry: TrackHistory = test::read_body_json(resp).await;
            assert_eq!(entry.user, alice.id);
            assert_eq!(entry.track.id, track.id);
        }

        let req = test::TestRequest::get()
            .uri("/track_history")
            .insert_header(bearer(&alice_token))
            .to_request();
        let entries: Vec<TrackHistory> = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<_> = entries.iter().map(|e| e.track.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let req = test::TestRequest::get()
            .uri("/track_history")
            .insert_header(bearer(&bob_token))
            .to_request();
        let entries: Vec<TrackHistory> = test::call_and_read_body_json(&app, req).await;
        assert!(entries.is_empty());
    }

    #[actix_web::test]
    async fn test_record_errors() {
        let ctx = TestApp::new().await;
        let (_, token) = create_user(&ctx.state, "alice", UserRole::User).await;
        let app = init_app!(ctx.state);

        let req = test::TestRequest::post()
            .uri("/track_history")
            .insert_header(bearer(&token))
            .set_json(json!({ "track": 404 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/track_history")
            .insert_header(bearer(&token))
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/track_history")
            .set_json(json!({ "track": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
