//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod storage;

pub use crypto::PasswordHasher;
pub use database::{
    init_database, run_migrations, DatabaseConfig, SeaOrmAccountStore, SeaOrmRoleStore,
};
pub use storage::InMemoryIdentityStore;
