//! Cross-cutting HTTP layers.

mod cors;
mod security;

pub use cors::cors_layer_from_env;
pub use security::security_headers;
