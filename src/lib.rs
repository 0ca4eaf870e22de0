//! ghls lists a GitHub user's repositories, caching the list under the home
//! directory for a day and printing the fields asked for.

pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod printer;
pub mod record;
