use std::fmt::Write;

/// Errors produced while setting up or running a probe.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Invalid target URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    /// The only per-task failure: refused, reset, DNS and timeouts all land here.
    #[error("No response from server")]
    NoResponse(#[source] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid YAML in '{path}'")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Renders an error together with its whole `source()` chain.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, "\n\nCaused by: {}", src);
        err = src;
    }
    s
}
