//! Typed configuration read from environment variables.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

use crate::mail::SmtpConfig;
use crate::object_store::CloudinaryConfig;

const DEFAULT_MAX_UPLOAD_BYTES: &str = "20971520";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be set")]
    Missing { key: &'static str },

    #[error("Invalid {key} value '{value}': {message}")]
    Invalid {
        key: &'static str,
        value: String,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub enum StoreBackend {
    Postgres {
        url: String,
        max_connections: u32,
        run_migrations: bool,
    },
    Memory,
}

#[derive(Debug, Clone)]
pub enum ObjectStoreBackend {
    /// Files kept under `root` and served at `/files`
    Disk { root: PathBuf },
    Cloudinary(CloudinaryConfig),
}

#[derive(Debug, Clone)]
pub enum MailTransport {
    Log,
    Smtp(SmtpConfig),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub object_store: ObjectStoreBackend,
    pub public_base_url: String,
    /// Linked from author invitation emails
    pub register_url: String,
    pub staging_dir: PathBuf,
    pub mail: MailTransport,
    pub mail_from: String,
    pub max_upload_bytes: usize,
}

/// Reads variables through a lookup function so tests can supply their own
struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn require(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing { key })
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
    }

    fn parse<T: FromStr>(&self, key: &'static str, default: &str) -> Result<T, ConfigError>
    where
        T::Err: Display,
    {
        let value = self.or_default(key, default);
        value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
            value,
        })
    }

    fn choice(&self, key: &'static str, default: &str, allowed: &[&str]) -> Result<String, ConfigError> {
        let value = self.or_default(key, default).trim().to_ascii_lowercase();
        if allowed.contains(&value.as_str()) {
            Ok(value)
        } else {
            Err(ConfigError::Invalid {
                key,
                message: format!("expected one of {}", allowed.join(", ")),
                value,
            })
        }
    }
}

impl Config {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup };

        let store = match env.choice("STORE_BACKEND", "postgres", &["postgres", "memory"])?.as_str() {
            "memory" => StoreBackend::Memory,
            _ => StoreBackend::Postgres {
                url: env.require("DATABASE_URL")?,
                max_connections: env.parse("DATABASE_MAX_CONNECTIONS", "5")?,
                run_migrations: env.parse("RUN_MIGRATIONS", "true")?,
            },
        };

        let object_store = match env.choice("OBJECT_STORE", "disk", &["disk", "cloudinary"])?.as_str() {
            "cloudinary" => ObjectStoreBackend::Cloudinary(CloudinaryConfig::new(
                env.require("CLOUDINARY_CLOUD_NAME")?,
                env.require("CLOUDINARY_API_KEY")?,
                env.require("CLOUDINARY_API_SECRET")?,
            )
            .with_sha256_enabled(env.parse("CLOUDINARY_SHA256_ENABLED", "false")?)),
            _ => ObjectStoreBackend::Disk {
                root: PathBuf::from(env.or_default("FILE_STORE_DIR", "./uploads")),
            },
        };

        let mail = match env.choice("MAIL_TRANSPORT", "log", &["log", "smtp"])?.as_str() {
            "smtp" => MailTransport::Smtp(SmtpConfig {
                host: env.require("SMTP_HOST")?,
                port: env.parse("SMTP_PORT", "587")?,
                username: env.require("SMTP_USERNAME")?,
                password: env.require("SMTP_PASSWORD")?,
            }),
            _ => MailTransport::Log,
        };

        let public_base_url = env
            .or_default("PUBLIC_BASE_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();
        let register_url = env.or_default("REGISTER_URL", &format!("{public_base_url}/sign-up"));
        let default_staging = std::env::temp_dir().join("paperdesk");
        let staging_dir = PathBuf::from(env.or_default(
            "STAGING_DIR",
            &default_staging.to_string_lossy(),
        ));

        Ok(Self {
            bind_addr: env.parse("BIND_ADDR", "0.0.0.0:3000")?,
            store,
            object_store,
            public_base_url,
            register_url,
            staging_dir,
            mail,
            mail_from: env.or_default("MAIL_FROM", "PaperDesk <no-reply@paperdesk.local>"),
            max_upload_bytes: env.parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}
