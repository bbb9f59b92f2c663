//! Search configuration and datastore credentials.
//!
//! The search config is a small JSON file:
//!
//! ```json
//! {
//!   "roles": ["data analyst", "backend engineer"],
//!   "cities": { "Pune": "Pune, Maharashtra, India" }
//! }
//! ```
//!
//! A missing file is not an error. The run degrades to a no-op ingestion and
//! still performs the retention sweep.

use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::env;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Primary environment variables for the datastore.
pub const URL_VAR: &str = "SUPABASE_URL";
pub const KEY_VAR: &str = "SUPABASE_KEY";

/// Keys read from the frontend's env file when the primary ones are absent.
pub const FALLBACK_URL_VAR: &str = "NEXT_PUBLIC_SUPABASE_URL";
pub const FALLBACK_KEY_VAR: &str = "NEXT_PUBLIC_SUPABASE_ANON_KEY";

/// Roles to search for and the cities to search them in.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchConfig {
    /// Search terms, one scrape per role and city.
    #[serde(default)]
    pub roles: Vec<String>,
    /// City label to the full location string handed to the scraper.
    #[serde(default)]
    pub cities: IndexMap<String, String>,
}

impl SearchConfig {
    /// Load the config from `path`.
    ///
    /// # Errors
    ///
    /// A file that exists but cannot be read or parsed is an error. A file
    /// that does not exist yields an empty config.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Search config not found; nothing will be scraped");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            roles = config.roles.len(),
            cities = config.cities.len(),
            "Loaded search config"
        );
        Ok(config)
    }

    /// Number of (role, city) searches this config produces.
    pub fn combinations(&self) -> usize {
        self.roles.len() * self.cities.len()
    }
}

/// URL and API key for the hosted datastore.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub key: String,
}

// Keep the key out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Whatever is still missing is taken from `fallback_env_file`.
    pub fn resolve(fallback_env_file: &Path) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }
        Self::resolve_with(|name| env::var(name).ok(), fallback_env_file)
    }

    /// Resolve credentials using `lookup` for the primary variables.
    ///
    /// Empty values count as missing. The fallback file only fills the
    /// values `lookup` did not provide.
    pub fn resolve_with(
        lookup: impl Fn(&str) -> Option<String>,
        fallback_env_file: &Path,
    ) -> Result<Self, ConfigError> {
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut url = present(URL_VAR);
        let mut key = present(KEY_VAR);

        if url.is_none() || key.is_none() {
            let (fallback_url, fallback_key) = read_fallback(fallback_env_file);
            url = url.or(fallback_url);
            key = key.or(fallback_key);
        }

        match (url, key) {
            (Some(url), Some(key)) => Ok(Self { url, key }),
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}

/// Read the fallback URL and key from an env file, ignoring any failure.
fn read_fallback(path: &Path) -> (Option<String>, Option<String>) {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Fallback env file unavailable");
            return (None, None);
        }
    };

    let mut url = None;
    let mut key = None;
    for entry in entries {
        match entry {
            Ok((name, value)) if value.trim().is_empty() => {
                debug!(%name, "Skipping empty fallback value");
            }
            Ok((name, value)) if name == FALLBACK_URL_VAR => url = Some(value),
            Ok((name, value)) if name == FALLBACK_KEY_VAR => key = Some(value),
            Ok(_) => {}
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Skipping unreadable line in fallback env file"
                );
            }
        }
    }
    if url.is_some() || key.is_some() {
        info!(path = %path.display(), "Using fallback credentials file");
    }
    (url, key)
}
