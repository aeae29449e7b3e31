use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_FOLDER: &str = "/store";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Parser, Debug, Clone)]
#[command(about = "Stores raw documents on disk and serves them back over HTTP")]
pub struct Args {
    /// The url of the current machine, used to build the returned document links.
    #[clap(short = 'u', long, env = "JSTORE_URL", default_value = DEFAULT_BASE_URL)]
    pub url: String,

    /// The port to listen on.
    #[clap(short = 'p', long, env = "JSTORE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Folder to store the documents in (absolute).
    #[clap(short = 'f', long, env = "JSTORE_FOLDER", default_value = DEFAULT_FOLDER)]
    pub folder: PathBuf,

    /// Address to bind the listener to.
    #[clap(long, env = "JSTORE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Number of HTTP worker threads, defaults to one per core.
    #[clap(long, env = "JSTORE_WORKERS")]
    pub workers: Option<usize>,

    /// Largest accepted request body in bytes.
    #[clap(long, env = "JSTORE_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Write to a temp file and rename it into place instead of rewriting documents in place.
    #[clap(long, env = "JSTORE_ATOMIC_WRITES")]
    pub atomic_writes: bool,
}
