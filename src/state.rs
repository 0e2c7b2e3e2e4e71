//! Shared application state
//!
//! Built once in `main` and handed to every handler as `web::Data<AppState>`.

use crate::config::{Paths, ServerConfig};
use crate::db::DbEngine;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: DbEngine,
    pub paths: Paths,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(db: DbEngine, paths: Paths, config: ServerConfig) -> Self {
        Self { db, paths, config }
    }
}
