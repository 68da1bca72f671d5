use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:4000";
const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
const DEFAULT_DATABASE_NAME: &str = "pricewar";
/// Admin token accepted in dev mode when `ADMIN_TOKEN` is unset.
const DEV_ADMIN_TOKEN: &str = "dev";

/// Location of the SQLite database. Absent config selects the in-memory store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: String,
}

impl DatabaseConfig {
    /// Resolve the file to open. A directory URL gets `{name}.db` appended.
    pub fn path(&self) -> PathBuf {
        let url = Path::new(&self.url);
        if url.is_dir() {
            url.join(format!("{}.db", self.name))
        } else {
            url.to_path_buf()
        }
    }
}

/// Payment provider credentials. Each secret is checked at the point of use.
#[derive(Debug, Clone)]
pub struct StripeSettings {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_base: String,
    pub timeout: Option<Duration>,
}

impl Default for StripeSettings {
    fn default() -> Self {
        Self {
            secret_key: None,
            webhook_secret: None,
            api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub database: Option<DatabaseConfig>,
    pub stripe: StripeSettings,
    pub admin_token: Option<String>,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("PRICEWAR_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(4000);

        let base_url = normalize_base_url(
            &env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port)),
        );

        let database = non_empty_var("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            name: non_empty_var("DATABASE_NAME")
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
        });

        let stripe = StripeSettings {
            secret_key: non_empty_var("STRIPE_SECRET_KEY"),
            webhook_secret: non_empty_var("STRIPE_WEBHOOK_SECRET"),
            api_base: non_empty_var("STRIPE_API_BASE")
                .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string()),
            timeout: env::var("STRIPE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        };

        let admin_token = non_empty_var("ADMIN_TOKEN")
            .or_else(|| dev_mode.then(|| DEV_ADMIN_TOKEN.to_string()));

        Self {
            host,
            port,
            base_url,
            database,
            stripe,
            admin_token,
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Strip the trailing slash from a base URL, falling back to the local default
/// when the value does not parse.
pub fn normalize_base_url(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) => url.as_str().trim_end_matches('/').to_string(),
        Err(_) => {
            tracing::warn!("Invalid BASE_URL {:?}, using {}", raw, DEFAULT_BASE_URL);
            DEFAULT_BASE_URL.to_string()
        }
    }
}
