pub mod app_error;
pub mod config;
pub mod locale;
pub mod models;
pub mod search;
pub mod web;

pub use crate::config::AppConfig;
