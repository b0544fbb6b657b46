pub mod admin;
pub mod api_client;
pub mod applications;
pub mod auth;
pub mod bookmarks;
pub mod config;
pub mod errors;
pub mod feed;
pub mod models;
pub mod notifications;
pub mod postings;
pub mod state;
