//! Process configuration, read once from the environment.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::warn;

pub const DEFAULT_PASSWORD: &str = "nao$";
pub const DEFAULT_SESSION_SECRET: &str = "dev-secret-key-change-in-production";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 720;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub app_password: String,
    pub session_secret: String,
    pub session_ttl_minutes: i64,
    pub database_url: Option<String>,
    pub use_persistent_stores: bool,
}

impl AppConfig {
    /// Read `BIND_ADDR`, `APP_PASSWORD`, `SESSION_SECRET`,
    /// `SESSION_TTL_MINUTES`, `DATABASE_URL` and `USE_PERSISTENT_STORES`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:8080")?;

        let session_ttl_minutes = match var("SESSION_TTL_MINUTES") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .with_context(|| format!("SESSION_TTL_MINUTES must be a positive integer (got {raw:?})"))?,
            None => DEFAULT_SESSION_TTL_MINUTES,
        };

        let use_persistent_stores = var("USE_PERSISTENT_STORES")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        let database_url = var("DATABASE_URL");
        if use_persistent_stores && database_url.is_none() {
            anyhow::bail!("USE_PERSISTENT_STORES is set but DATABASE_URL is missing");
        }

        Ok(Self {
            bind_addr,
            app_password: var("APP_PASSWORD").unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            session_secret: var("SESSION_SECRET").unwrap_or_else(|| DEFAULT_SESSION_SECRET.to_string()),
            session_ttl_minutes,
            database_url,
            use_persistent_stores,
        })
    }

    /// Log a warning for every insecure default still in effect.
    pub fn warn_insecure_defaults(&self, password_is_weak: bool) {
        if self.app_password == DEFAULT_PASSWORD || password_is_weak {
            warn!("APP_PASSWORD is not securely configured; set a strong value in production");
        }
        if self.session_secret == DEFAULT_SESSION_SECRET {
            warn!("SESSION_SECRET is using the development default; session tokens can be forged");
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("use_persistent_stores", &self.use_persistent_stores)
            .finish_non_exhaustive()
    }
}
