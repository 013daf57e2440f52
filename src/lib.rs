//! Staggered concurrent HTTP probe for looking at a server's accept backlog,
//! plus the static target server it is usually pointed at.
pub mod config;
pub mod error;
pub mod http_probe;
pub mod target_server;

/// Initializes `env_logger`, `RUST_LOG` overrides the given default filter.
pub fn init_logging(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
