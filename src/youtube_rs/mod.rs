//! Thin wrappers around the YouTube Data API v3 and Google OAuth endpoints.
//!
//! Docs:
//! https://developers.google.com/youtube/v3/docs

pub mod auth;
pub mod playlist;
pub mod types;
