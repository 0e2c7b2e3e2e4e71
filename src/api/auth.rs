//! User accounts and sessions, cookie or bearer JWT

use actix_multipart::Multipart;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::form::FormData;
use super::store_upload;
use crate::core::uploads::remove_image;
use crate::db::tables::UserTable;
use crate::errors::{ApiError, OrInternal};
use crate::models::{Session, User};
use crate::state::AppState;
use crate::utils::auth::{create_jwt, hash_password, verify_jwt, verify_password};

pub const ACCESS_COOKIE: &str = "access_token_cookie";

/// login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// register a new account (multipart: username, password, displayName, avatar)
#[post("")]
pub async fn register(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    const FAILURE: &str = "Error registering user";
    let pool = state.db.pool();

    let mut form = FormData::read(payload, state.config.max_upload_size).await?;
    let (Some(username), Some(password), Some(display_name)) = (
        form.text("username"),
        form.text("password"),
        form.text("displayName"),
    ) else {
        return Err(ApiError::validation(
            "Username, password and display name are required",
        ));
    };
    let (username, password, display_name) = (
        username.to_string(),
        password.to_string(),
        display_name.to_string(),
    );

    if UserTable::get_by_username(pool, &username)
        .await
        .or_internal(FAILURE)?
        .is_some()
    {
        return Err(ApiError::validation("Username already taken"));
    }

    let mut user = User::new(username, hash_password(&password), display_name);
    user.avatar = store_upload(&state.paths, form.take_file("avatar"), FAILURE)?;

    let inserted = UserTable::insert(pool, &user).await.or_internal(FAILURE);
    user.id = match inserted {
        Ok(id) => id,
        Err(e) => {
            if let Some(avatar) = &user.avatar {
                remove_image(&state.paths, avatar);
            }
            return Err(e);
        }
    };

    tracing::info!("Registered user '{}'", user.username);
    session_response(&state, user, HttpResponse::Created(), FAILURE)
}

/// login endpoint
#[post("/sessions")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    const FAILURE: &str = "Error logging in";
    const WRONG: &str = "Username or password are wrong";

    let user = UserTable::get_by_username(state.db.pool(), &body.username)
        .await
        .or_internal(FAILURE)?
        .ok_or_else(|| ApiError::validation(WRONG))?;

    if !verify_password(&body.password, &user.password).or_internal(FAILURE)? {
        return Err(ApiError::validation(WRONG));
    }

    session_response(&state, user, HttpResponse::Ok(), FAILURE)
}

/// logout: invalidates every token issued to the caller and clears the cookie
#[delete("/sessions")]
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    match auth_user_optional(&req, &state).await {
        Ok(Some(user)) => {
            UserTable::rotate_session_nonce(state.db.pool(), user.id)
                .await
                .or_internal("Error logging out")?;
        }
        // no session or a dead one: nothing left to revoke
        Ok(None) | Err(ApiError::Unauthorized(_)) => {}
        Err(e) => return Err(e),
    }

    let cookie = Cookie::build(ACCESS_COOKIE, "")
        .path("/")
        .max_age(CookieDuration::seconds(0))
        .http_only(true)
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "message": "Logged out"
    })))
}

/// get logged in user
#[get("/me")]
pub async fn me(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req, &state).await?;
    Ok(HttpResponse::Ok().json(user))
}

// helpers

fn session_response(
    state: &AppState,
    user: User,
    mut builder: actix_web::HttpResponseBuilder,
    failure: &'static str,
) -> Result<HttpResponse, ApiError> {
    let token = create_jwt(
        &user,
        &state.config.server_id,
        state.config.access_max_age.max(0) as u64,
    )
    .or_internal(failure)?;

    let cookie = Cookie::build(ACCESS_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::seconds(state.config.access_max_age))
        .finish();

    Ok(builder.cookie(cookie).json(Session { user, token }))
}

/// The signed-in user, or 401
pub async fn require_user(req: &HttpRequest, state: &AppState) -> Result<User, ApiError> {
    auth_user_optional(req, state)
        .await?
        .ok_or(ApiError::Unauthorized("User not authenticated"))
}

/// The signed-in admin, 401 without a session and 403 for other roles
pub async fn require_admin(req: &HttpRequest, state: &AppState) -> Result<User, ApiError> {
    let user = require_user(req, state).await?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(ApiError::Forbidden("Only admins can do that"))
    }
}

/// Resolve the session if a token was sent. A token that was sent but does
/// not check out is an error, not an anonymous caller.
pub async fn auth_user_optional(req: &HttpRequest, state: &AppState) -> Result<Option<User>, ApiError> {
    let Some(token) = access_token(req)? else {
        return Ok(None);
    };

    let claims = verify_jwt(&token, &state.config.server_id)
        .map_err(|_| ApiError::Unauthorized("Invalid token"))?;

    let user = UserTable::get_by_id(state.db.pool(), claims.sub)
        .await
        .or_internal("Error checking session")?;

    match user {
        Some(user) if user.session_nonce == claims.nonce => Ok(Some(user)),
        _ => Err(ApiError::Unauthorized("Invalid token")),
    }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<String>, ApiError> {
    match req.headers().get("Authorization") {
        Some(header_value) => {
            let header_str = header_value.to_str().unwrap_or("").trim();
            let token = header_str.strip_prefix("Bearer ").unwrap_or(header_str).trim();

            if token.is_empty() {
                return Err(ApiError::Unauthorized("Invalid token format"));
            }

            Ok(Some(token.to_string()))
        }
        None => Ok(None),
    }
}

fn access_token(req: &HttpRequest) -> Result<Option<String>, ApiError> {
    if let Some(cookie) = req.cookie(ACCESS_COOKIE) {
        if !cookie.value().is_empty() {
            return Ok(Some(cookie.value().to_string()));
        }
    }

    bearer_token(req)
}

/// configure user routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(me);
}
