//! Database module
//!
//! SQLite through sqlx. The engine is constructed once at startup and handed
//! to the handlers through app state; tables take the pool explicitly.

mod engine;
pub mod tables;

pub use engine::DbEngine;
pub use tables::*;
