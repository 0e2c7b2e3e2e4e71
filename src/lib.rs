//! media-catalog
//!
//! A music catalog REST backend (artists, albums, tracks, users) with
//! role-aware listings and image uploads, plus the typed client state layer
//! that consumes it.

pub mod api;
pub mod client;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod state;
pub mod utils;

#[cfg(test)]
mod testing;
