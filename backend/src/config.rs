//! Runtime configuration from environment variables.
//!
//! `.env` files are loaded by the binary (`dotenvy`) before
//! [`AppConfig::from_env`] runs.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OUTPUT_DIR: &str = ".tabload/commits";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// HTTP port for `serve`
    pub port: u16,
    /// Remote store endpoint; commits go to `output_dir` when unset
    pub commit_url: Option<String>,
    /// Bearer token sent with remote commits
    pub commit_token: Option<String>,
    pub output_dir: PathBuf,
    /// Multipart body limit in megabytes
    pub max_upload_mb: usize,
    /// Field key that receives placeholder ids on commit
    pub placeholder_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            commit_url: None,
            commit_token: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            placeholder_key: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            port: parse_or(get("TABLOAD_PORT"), "TABLOAD_PORT", defaults.port),
            commit_url: get("TABLOAD_COMMIT_URL"),
            commit_token: get("TABLOAD_COMMIT_TOKEN"),
            output_dir: get("TABLOAD_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            max_upload_mb: parse_or(
                get("TABLOAD_MAX_UPLOAD_MB"),
                "TABLOAD_MAX_UPLOAD_MB",
                defaults.max_upload_mb,
            ),
            placeholder_key: get("TABLOAD_PLACEHOLDER_KEY"),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn parse_or<T>(value: Option<String>, name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{} has invalid value '{}', using {}", name, raw, default);
            default
        }),
    }
}
