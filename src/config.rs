// SPDX-License-Identifier: MIT

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding the embedded database | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5001` |
//! | `JWT_SECRET_KEY` | HS256 signing secret for session tokens | Required |
//! | `APP_ENV` | `production` enables the `Secure` cookie attribute | `development` |
//! | `CHAT_API_URL` | Chat backend base URL for identity sync | Unset (sync skipped) |
//! | `CHAT_API_KEY` | Chat backend API key | Unset (sync skipped) |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;

/// Environment variable holding the session-token signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET_KEY";

/// Environment variable for the data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Resolved startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    /// Set the `Secure` attribute on session cookies (`APP_ENV=production`).
    pub secure_cookies: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),
}

impl AppConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", "0.0.0.0");
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse()
            .unwrap_or(5001);
        let data_dir = PathBuf::from(env_or_default(DATA_DIR_ENV, "/data"));
        let jwt_secret =
            env::var(JWT_SECRET_ENV).map_err(|_| ConfigError::MissingEnv(JWT_SECRET_ENV))?;
        let secure_cookies = env_or_default("APP_ENV", "development") == "production";

        Ok(Self {
            host,
            port,
            data_dir,
            jwt_secret,
            secure_cookies,
        })
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
