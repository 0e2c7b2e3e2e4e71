//! REST API routes

pub mod album;
pub mod artist;
pub mod auth;
pub mod form;
pub mod track;
pub mod track_history;

use actix_web::web;

use crate::config::Paths;
use crate::core::uploads::{self, UploadError, UploadedFile};
use crate::errors::ApiError;

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // malformed bodies and queries get the same {error} shape as everything else
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            ApiError::validation(err.to_string()).into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            ApiError::validation(err.to_string()).into()
        }))
        // Artist routes
        .service(web::scope("/artists").configure(artist::configure))
        // Album routes
        .service(web::scope("/albums").configure(album::configure))
        // Track routes
        .service(web::scope("/tracks").configure(track::configure))
        // User and session routes
        .service(web::scope("/users").configure(auth::configure))
        // Listening history routes
        .service(web::scope("/track_history").configure(track_history::configure));
}

/// Parse a path id; anything unparseable cannot exist, so it is a 404
pub(crate) fn parse_id(raw: &str, missing: &'static str) -> Result<i64, ApiError> {
    raw.trim().parse().map_err(|_| ApiError::NotFound(missing))
}

/// Persist an optional uploaded image and return its reference
pub(crate) fn store_upload(
    paths: &Paths,
    file: Option<UploadedFile>,
    failure: &'static str,
) -> Result<Option<String>, ApiError> {
    let Some(file) = file else {
        return Ok(None);
    };

    match uploads::save_image(paths, &file.bytes) {
        Ok(reference) => Ok(Some(reference)),
        Err(UploadError::NotAnImage) => Err(ApiError::validation(format!(
            "Field '{}' must be an image",
            file.field
        ))),
        Err(e) => {
            tracing::error!("{}: {}", failure, e);
            Err(ApiError::Internal(failure))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 12 ", "Album not found").unwrap(), 12);
        assert!(matches!(
            parse_id("64f1c0ffee", "Album not found"),
            Err(ApiError::NotFound("Album not found"))
        ));
    }
}
