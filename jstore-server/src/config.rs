use std::path::PathBuf;

use blob_store::WriteMode;
use thiserror::Error;
use url::Url;

use crate::params::{Args, DEFAULT_BASE_URL, DEFAULT_HOST, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT};

#[derive(Debug, Error)]
pub enum ConfigErr {
    #[error("Invalid base url {url:?}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Base url {0:?} must be an absolute http or https url")]
    BaseUrlScheme(String),
}

/// Process-wide settings, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    base_url: String,
    pub bind_addr: (String, u16),
    pub storage_root: PathBuf,
    pub write_mode: WriteMode,
    pub max_body_bytes: usize,
    pub workers: Option<usize>,
}

impl ServerConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigErr> {
        let base_url = validate_base_url(&args.url)?;
        if !args.folder.is_absolute() {
            tracing::warn!("storage folder {} is relative", args.folder.display());
        }
        Ok(Self {
            base_url,
            bind_addr: (args.host.clone(), args.port),
            storage_root: args.folder.clone(),
            write_mode: if args.atomic_writes { WriteMode::AtomicRename } else { WriteMode::InPlace },
            max_body_bytes: args.max_body_bytes,
            workers: args.workers,
        })
    }

    /// Minimal config for a store rooted at `storage_root`, with the default
    /// base url and limits.
    pub fn for_root(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            bind_addr: (DEFAULT_HOST.to_string(), DEFAULT_PORT),
            storage_root: storage_root.into(),
            write_mode: WriteMode::InPlace,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            workers: None,
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigErr> {
        self.base_url = validate_base_url(url)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The externally visible link to a document.
    pub fn document_url(&self, id: &str) -> String {
        format!("{}/{}.json", self.base_url, id)
    }
}

/// Checks the url parses as http(s) and strips trailing slashes so document
/// links never contain `//`.
fn validate_base_url(raw: &str) -> Result<String, ConfigErr> {
    let parsed = Url::parse(raw).map_err(|source| ConfigErr::BaseUrl { url: raw.to_string(), source })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
        return Err(ConfigErr::BaseUrlScheme(raw.to_string()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
