//! # Identity API
//!
//! Minimal identity HTTP service: registration, login with lockout, role
//! creation and role assignment, with localized (Turkish by default) messages.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Users, roles, store traits and the error taxonomy
//! - **application**: Credential verification, password/lockout policy, role use-cases
//! - **infrastructure**: bcrypt hashing, SeaORM stores and migrations, in-memory store
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Message catalog, request validation, shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
