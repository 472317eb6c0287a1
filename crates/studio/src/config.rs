use std::path::PathBuf;

/// Studio client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    /// Base URL of the generation service (default: `http://127.0.0.1:8000`).
    pub api_url: String,
    /// Directory exported stories are written to (default: `.`).
    pub download_dir: PathBuf,
}

impl StudioConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var          | Default                 |
    /// |------------------|-------------------------|
    /// | `STUDIO_API_URL` | `http://127.0.0.1:8000` |
    /// | `DOWNLOAD_DIR`   | `.`                     |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("STUDIO_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| "http://127.0.0.1:8000".into());

        let download_dir = non_empty("DOWNLOAD_DIR")
            .map(|v| PathBuf::from(v.trim()))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            api_url,
            download_dir,
        }
    }
}
