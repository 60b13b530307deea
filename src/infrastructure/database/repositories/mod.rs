//! Database repository implementations
//!
//! SeaORM-backed account and role stores.

pub mod role_repository;
pub mod user_repository;

pub use role_repository::SeaOrmRoleStore;
pub use user_repository::SeaOrmAccountStore;
