use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Scheduled BNPB statistics sync
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub enabled: bool,
    /// Hour of day in WIB (UTC+7) at which the daily sync runs
    pub hour_wib: u32,
    pub run_on_startup: bool,
    pub request_timeout: Duration,
    pub base_url: String,
}

/// Offline LOD boundary import
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub data_dir: PathBuf,
}

/// Headless map client used by `lod-replay`
#[derive(Debug, Clone)]
pub struct LodClientConfig {
    pub api_base_url: String,
    pub debounce: Duration,
    pub fade_out: Duration,
    pub fade_in: Duration,
    pub send_viewport_bounds: bool,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            sync: SyncConfig::from_env()?,
        })
    }
}

/// Load `.env` if present. A missing file is fine in production.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String>
where
    T: ToString,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| format!("{} must be a valid number", name))
}

fn parse_bool(name: &str, default: bool) -> Result<bool, String> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("{} must be true or false", name)),
        },
    }
}

impl AppConfig {
    const DEFAULT_PORT: u16 = 5000;
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| Self::DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = parse_var(
            "MAX_REQUEST_BODY_SIZE",
            Self::DEFAULT_MAX_REQUEST_BODY_SIZE,
        )?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_var("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_var(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_var("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_var("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Kawal Banjir API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Sumatra flood monitoring and LOD boundary API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl SyncConfig {
    const DEFAULT_HOUR_WIB: u32 = 6;
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_BASE_URL: &'static str =
        "https://gis.bnpb.go.id/server/rest/services/thematic/BANSOR_SUMATERA/MapServer/17";

    pub fn from_env() -> Result<Self, String> {
        let hour_wib = parse_var("BNPB_SYNC_HOUR", Self::DEFAULT_HOUR_WIB)?;
        if hour_wib > 23 {
            return Err("BNPB_SYNC_HOUR must be between 0 and 23".to_string());
        }

        let timeout_secs = parse_var(
            "BNPB_REQUEST_TIMEOUT_SECS",
            Self::DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            enabled: parse_bool("BNPB_SYNC_ENABLED", true)?,
            hour_wib,
            run_on_startup: parse_bool("BNPB_SYNC_ON_STARTUP", false)?,
            request_timeout: Duration::from_secs(timeout_secs),
            base_url: env::var("BNPB_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.into()),
        })
    }
}

impl ImportConfig {
    pub fn from_env() -> Result<Self, String> {
        let data_dir = env::var("BOUNDARY_DATA_DIR").unwrap_or_else(|_| "./data".to_string());
        Ok(Self {
            data_dir: PathBuf::from(data_dir),
        })
    }
}

impl LodClientConfig {
    const DEFAULT_API_BASE_URL: &'static str = "http://localhost:5000/api";
    const DEFAULT_DEBOUNCE_MS: u64 = 300;
    const DEFAULT_FADE_OUT_MS: u64 = 300;
    const DEFAULT_FADE_IN_MS: u64 = 100;
    const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

    pub fn from_env() -> Result<Self, String> {
        let api_base_url =
            env::var("LOD_API_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_API_BASE_URL.into());

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            debounce: Duration::from_millis(parse_var(
                "LOD_DEBOUNCE_MS",
                Self::DEFAULT_DEBOUNCE_MS,
            )?),
            fade_out: Duration::from_millis(parse_var(
                "LOD_FADE_OUT_MS",
                Self::DEFAULT_FADE_OUT_MS,
            )?),
            fade_in: Duration::from_millis(parse_var("LOD_FADE_IN_MS", Self::DEFAULT_FADE_IN_MS)?),
            send_viewport_bounds: parse_bool("LOD_SEND_VIEWPORT_BOUNDS", false)?,
            http_timeout: Duration::from_secs(parse_var(
                "LOD_HTTP_TIMEOUT_SECS",
                Self::DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        })
    }
}

impl Default for LodClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            debounce: Duration::from_millis(Self::DEFAULT_DEBOUNCE_MS),
            fade_out: Duration::from_millis(Self::DEFAULT_FADE_OUT_MS),
            fade_in: Duration::from_millis(Self::DEFAULT_FADE_IN_MS),
            send_viewport_bounds: false,
            http_timeout: Duration::from_secs(Self::DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lod_client_defaults_match_map_timings() {
        let config = LodClientConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.fade_out, Duration::from_millis(300));
        assert_eq!(config.fade_in, Duration::from_millis(100));
        assert!(!config.send_viewport_bounds);
    }

    #[test]
    fn test_swagger_credentials_require_both_parts() {
        let mut swagger = SwaggerConfig {
            username: Some("admin".into()),
            password: None,
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert_eq!(swagger.credentials(), None);

        swagger.password = Some("secret".into());
        assert_eq!(swagger.credentials().as_deref(), Some("admin:secret"));
    }
}
