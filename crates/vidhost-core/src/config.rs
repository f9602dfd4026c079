//! Configuration module
//!
//! Environment-driven configuration for the API server: network, database,
//! storage backend selection, external tool paths, and auth settings. Loaded
//! once at startup with `Config::from_env()` and validated before serving.

use std::env;

use serde::{Deserialize, Serialize};

const DEFAULT_SERVER_PORT: u16 = 8091;
const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
const DEFAULT_FFPROBE_PATH: &str = "ffprobe";
const DEFAULT_ASSETS_ROOT: &str = "./assets";

/// Storage backend kind selected via `STORAGE_BACKEND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub database_url: String,
    pub jwt_secret: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Thumbnail assets
    pub assets_root: String,
    pub assets_base_url: String,
    // External tools
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let server_port = env_opt("SERVER_PORT")
            .map(|v| v.parse::<u16>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("Invalid SERVER_PORT: {}", e))?
            .unwrap_or(DEFAULT_SERVER_PORT);

        let environment = env_opt("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let database_url = env_opt("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let jwt_secret =
            env_opt("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?;

        let storage_backend = match env_opt("STORAGE_BACKEND").as_deref() {
            None | Some("s3") => StorageBackend::S3,
            Some("local") => StorageBackend::Local,
            Some(other) => {
                anyhow::bail!("Invalid STORAGE_BACKEND '{}': expected 's3' or 'local'", other)
            }
        };

        let assets_root = env_opt("ASSETS_ROOT").unwrap_or_else(|| DEFAULT_ASSETS_ROOT.to_string());
        let assets_base_url = env_opt("ASSETS_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}/assets", server_port));

        Ok(Config {
            server_port,
            environment,
            database_url,
            jwt_secret,
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            assets_root,
            assets_base_url,
            ffmpeg_path: env_opt("FFMPEG_PATH").unwrap_or_else(|| DEFAULT_FFMPEG_PATH.to_string()),
            ffprobe_path: env_opt("FFPROBE_PATH")
                .unwrap_or_else(|| DEFAULT_FFPROBE_PATH.to_string()),
        })
    }

    /// Validate backend-specific settings before the server starts.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    anyhow::bail!("S3_BUCKET must be set when STORAGE_BACKEND=s3");
                }
                if self.s3_region.is_none() {
                    anyhow::bail!("S3_REGION or AWS_REGION must be set when STORAGE_BACKEND=s3");
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    anyhow::bail!("LOCAL_STORAGE_PATH must be set when STORAGE_BACKEND=local");
                }
                if self.local_storage_base_url.is_none() {
                    anyhow::bail!("LOCAL_STORAGE_BASE_URL must be set when STORAGE_BACKEND=local");
                }
            }
        }
        if self.jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
