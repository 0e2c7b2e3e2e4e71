//! Configuration module
//!
//! Filesystem layout plus the JSON settings file kept next to the database.

mod paths;
mod server_config;

pub use paths::Paths;
pub use server_config::ServerConfig;

/// Public URL prefix under which uploaded images are served
pub const IMAGES_URL_PREFIX: &str = "images";
