//! Interface adapters (inbound HTTP)

pub mod http;
