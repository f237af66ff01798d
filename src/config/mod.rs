use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub uploads: UploadConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub port: u16,
    /// Prefix for public file URLs (avatars, attachments). Empty keeps them relative.
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: String,
    /// Full connection URL; wins over the individual parts when set
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // App overrides
        if let Ok(v) = env::var("APP_NAME") {
            self.app.name = v;
        }
        if let Ok(v) = env::var("APP_PORT") {
            self.app.port = v.parse().unwrap_or(self.app.port);
        }
        if let Ok(v) = env::var("APP_BASE_URL") {
            self.app.base_url = v.trim_end_matches('/').to_string();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DB_SSLMODE") {
            self.database.ssl_mode = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            if !v.trim().is_empty() {
                self.uploads.dir = PathBuf::from(v);
            }
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            app: AppSettings::default(),
            database: DatabaseConfig {
                max_connections: 25,
                connection_timeout: 30,
                ..DatabaseConfig::default()
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 12 * 1024 * 1024, // 10MB documents plus multipart overhead
            },
            uploads: UploadConfig::default(),
            security: SecurityConfig {
                cors_origins: vec![],
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 25,
                connection_timeout: 10,
                ..DatabaseConfig::default()
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                ssl_mode: "require".to_string(),
                ..DatabaseConfig::default()
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 12 * 1024 * 1024,
            },
            ..Self::development()
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "Helpdesk API".to_string(),
            port: 8080,
            base_url: String::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            name: "helpdesk".to_string(),
            ssl_mode: "disable".to_string(),
            url: None,
            max_connections: 25,
            connection_timeout: 30,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!(
            $crate::config::CONFIG.environment,
            $crate::config::Environment::Production
        )
    };
}
