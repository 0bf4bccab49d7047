//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_SERVER__PORT`). Provides helpers
//! to expand `~` and `${VAR}` and to resolve relative paths against the
//! directory the config was loaded from.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::mapper::DecodePolicy;
use crate::query::CombinePolicy;
use crate::service::SearchOptions;

/// Smallest writer heap tantivy accepts per indexing thread.
pub const MIN_WRITER_HEAP_BYTES: usize = 15_000_000;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."), None)
    }

    /// Loads `config.toml` and the env overlay from `dir`. `env_name`
    /// overrides `RUST_ENV` (default `dev`).
    pub fn load_from(dir: &Path, env_name: Option<&str>) -> anyhow::Result<Self> {
        let env_name = match env_name {
            Some(e) => e.to_string(),
            None => env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string()),
        };

        let mut figment = Figment::new().merge(Toml::file(dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: dir.to_path_buf() };
        config.settings()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment, base_dir: &Path) -> Self {
        Self { figment, base_dir: base_dir.to_path_buf() }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The full typed settings, validated. Missing sections take defaults.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn index_dir(&self) -> anyhow::Result<PathBuf> {
        Ok(resolve_with_base(&self.base_dir, self.settings()?.index.dir))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub index: IndexSettings,
    pub search: SearchSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.search.max_hits == 0 {
            return Err(Error::InvalidConfig("search.max_hits must be > 0".into()));
        }
        if self.search.max_buckets == 0 {
            return Err(Error::InvalidConfig("search.max_buckets must be > 0".into()));
        }
        if self.index.writer_heap_bytes < MIN_WRITER_HEAP_BYTES {
            return Err(Error::InvalidConfig(format!(
                "index.writer_heap_bytes must be >= {}, got {}",
                MIN_WRITER_HEAP_BYTES, self.index.writer_heap_bytes
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080 }
    }
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Relative paths resolve against the config directory.
    pub dir: String,
    pub writer_heap_bytes: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { dir: "./data/index/books".to_string(), writer_heap_bytes: 50_000_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Upper bound on hits returned by one query.
    pub max_hits: usize,
    /// Upper bound on buckets returned by one aggregation.
    pub max_buckets: u32,
    pub combine: CombinePolicy,
    pub decode: DecodePolicy,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_hits: 1000,
            max_buckets: 100,
            combine: CombinePolicy::default(),
            decode: DecodePolicy::default(),
        }
    }
}

impl SearchSettings {
    pub fn options(&self) -> SearchOptions {
        SearchOptions { combine: self.combine, decode: self.decode }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
