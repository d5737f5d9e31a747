//! # repolang
//!
//! HTTP proxy over the GitHub repository search API. Every search hit is
//! enriched with the repository's language byte counts, fetched concurrently,
//! and the aggregate is cached by request URL.
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration
//! - [`github`] - Versioned query builder, transport and wire types
//! - [`cache`] - Cache stores (memory, file) and the caching layer around fetches
//! - [`fanout`] - Ordered concurrent mapping with per-task timeouts
//! - [`aggregate`] - Search + language enrichment pipeline
//! - [`model`] - Repository and search result types
//! - [`api`] - Axum handlers and response envelopes
//! - [`state`] - Shared application state

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fanout;
pub mod github;
pub mod model;
pub mod state;
