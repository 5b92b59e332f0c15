//! Protocol adapters (HTTP)
//!
//! This crate bridges the HTTP control surface to the host: [`WorldControl`]
//! turns commands into host work and [`HttpServer`] exposes it over axum.

pub mod control;
pub mod http_server;

pub use control::{CommandReport, ControlError, WorldControl};
pub use http_server::{router, BoundServer, HttpServer, ServerConfig, ServerError};
