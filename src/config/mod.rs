use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub reset_token_expiration_secs: u64,
    pub bcrypt_cost: u32,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub cors_origin: Option<String>,
    pub reset_link_base: String,
}

/// Longest token or reset-grant lifetime accepted from the environment (ten years).
pub const MAX_LIFETIME_SECS: u64 = 10 * 365 * 24 * 3600;

/// Parses durations written as `24h`, `30m`, `45s` or a bare number of hours.
/// Values past [`MAX_LIFETIME_SECS`] are rejected.
fn parse_duration_secs(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (idx, 'h') => (&raw[..idx], 3600),
        (idx, 'm') => (&raw[..idx], 60),
        (idx, 's') => (&raw[..idx], 1),
        _ => (raw, 3600),
    };
    digits
        .trim()
        .parse::<u64>()
        .ok()?
        .checked_mul(unit)
        .filter(|secs| *secs <= MAX_LIFETIME_SECS)
}

/// Converts a configured lifetime for date arithmetic, capped at [`MAX_LIFETIME_SECS`].
pub fn bounded_lifetime(lifetime: Duration) -> chrono::Duration {
    let capped = lifetime.min(Duration::from_secs(MAX_LIFETIME_SECS));
    chrono::Duration::from_std(capped).unwrap_or_else(|_| chrono::Duration::zero())
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let store_backend = match var_or("STORE", "postgres").to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            _ => StoreBackend::Postgres,
        };
        let database_url = match store_backend {
            StoreBackend::Postgres => env::var("DATABASE_URL")?,
            StoreBackend::Memory => env::var("DATABASE_URL").unwrap_or_default(),
        };

        let jwt_expiration = parse_duration_secs(&var_or("JWT_EXPIRATION", "24h")).unwrap_or(24 * 3600);
        let reset_expiration =
            parse_duration_secs(&var_or("RESET_TOKEN_EXPIRATION", "1h")).unwrap_or(3600);

        Ok(Config {
            store_backend,
            database_url,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", "10").parse().unwrap_or(10),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration,
            reset_token_expiration_secs: reset_expiration,
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
            server_host: var_or("SERVER_HOST", "0.0.0.0"),
            server_port: var_or("SERVER_PORT", "5000").parse().unwrap_or(5000),
            api_base_uri: var_or("API_BASE_URI", "/api"),
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|v| !v.is_empty()),
            reset_link_base: var_or("RESET_LINK_BASE", "http://localhost:5173/login"),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn reset_token_expiration(&self) -> Duration {
        Duration::from_secs(self.reset_token_expiration_secs)
    }
}
