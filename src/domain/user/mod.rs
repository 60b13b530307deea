//! User aggregate
//!
//! Contains the User entity, the creation DTO, and the account store port.

pub mod model;
pub mod repository;

mod dto_create;

pub use dto_create::NewUser;
pub use model::{is_valid_user_name, normalize_email, User};
pub use repository::AccountStore;
