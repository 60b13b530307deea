pub mod messages;
pub mod shutdown;
pub mod validations;

pub use messages::{Locale, MessageKey, Messages};
pub use shutdown::*;
pub use validations::*;
