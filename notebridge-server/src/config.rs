use std::path::PathBuf;

use axum::http::HeaderValue;
use clap::Parser;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

/// Listener, CORS and mirror-file settings. Every flag falls back to an
/// environment variable so the binary runs unchanged from a `.env` file.
#[derive(Clone, Debug, Parser)]
#[command(name = "notebridge", about = "Notebook analysis bridge", long_about = None)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// `*` for any origin, otherwise a comma-separated list
    #[arg(long = "allowed-origin", env = "ALLOWED_ORIGIN", default_value = "*")]
    pub allowed_origin: String,

    /// Overwrite this file with the latest snapshot on every save
    #[arg(long = "notebook-log", env = "NOTEBOOK_LOG_PATH", value_name = "FILE")]
    pub notebook_log: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origin: "*".to_string(),
            notebook_log: None,
        }
    }
}

impl ServerConfig {
    pub fn allowed_origins(&self) -> AllowedOrigins {
        AllowedOrigins::parse(&self.allowed_origin)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cors_layer(&self) -> CorsLayer {
        match self.allowed_origins() {
            AllowedOrigins::Any => CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
            AllowedOrigins::List(origins) => {
                let origins = origins
                    .iter()
                    .filter_map(|origin| match HeaderValue::from_str(origin) {
                        Ok(value) => Some(value),
                        Err(_) => {
                            tracing::warn!(origin = %origin, "ignoring invalid allowed origin");
                            None
                        }
                    })
                    .collect::<Vec<_>>();
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(AllowMethods::mirror_request())
                    .allow_headers(AllowHeaders::mirror_request())
                    .allow_credentials(true)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    pub fn parse(raw: &str) -> Self {
        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect::<Vec<_>>();
        if origins.is_empty() || origins.contains(&"*") {
            return AllowedOrigins::Any;
        }
        AllowedOrigins::List(origins.into_iter().map(ToOwned::to_owned).collect())
    }
}
