pub mod auth;
pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Items are reached through their module paths, e.g. `bookmark_service::services::AppState`.
