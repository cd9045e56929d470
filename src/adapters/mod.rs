// Adapters layer: concrete implementations of the domain ports (http, packaging, error reporting).

pub mod http;
pub mod packager;
pub mod reporter;
