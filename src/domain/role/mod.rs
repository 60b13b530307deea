//! Role aggregate

pub mod model;
pub mod repository;

pub use model::{normalize_role_name, AssignOutcome, Role};
pub use repository::RoleStore;
