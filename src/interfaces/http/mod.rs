//! HTTP REST API interfaces
//!
//! - `common`: response bodies, error mapping, validated JSON extractor
//! - `modules`: handlers grouped by feature
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, ApiState};
