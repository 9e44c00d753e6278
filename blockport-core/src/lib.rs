pub mod app_context;
pub mod auth;
pub mod common;
pub mod config;
pub mod database;
pub mod errors;
pub mod partial_import;
pub mod services;

pub use app_context::AppContext;
