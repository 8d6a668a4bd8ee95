//! Hacker House API Library
//!
//! Server-side pieces of the hacker house front end. The service proxies
//! Talent Protocol identity lookups so the browser never sees the API key or
//! the upstream's resolve-then-fetch protocol.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `lookup`: Resolve-then-derive lookup pipeline.
//! - `models`: Request, action and profile models.
//! - `openapi`: Generated OpenAPI document.
//! - `routes`: Router assembly.
//! - `talent_client`: Talent Protocol API client.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod lookup;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod talent_client;
