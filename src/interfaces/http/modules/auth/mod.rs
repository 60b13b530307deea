//! Authentication module: register, login, roles, password change

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
