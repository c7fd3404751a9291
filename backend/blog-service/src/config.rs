//! Configuration management for blog-service.
//!
//! Loads configuration from environment variables at startup.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication key material
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// JWT signing keys, PEM-encoded RSA
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_private_key_pem: String,
    pub jwt_public_key_pem: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("BLOG_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("BLOG_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/blog".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            auth: AuthConfig {
                jwt_private_key_pem: std::env::var("JWT_PRIVATE_KEY_PEM")
                    .map_err(|_| "JWT_PRIVATE_KEY_PEM must be set".to_string())?,
                jwt_public_key_pem: std::env::var("JWT_PUBLIC_KEY_PEM")
                    .map_err(|_| "JWT_PUBLIC_KEY_PEM must be set".to_string())?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "APP_ENV",
            "BLOG_SERVICE_HOST",
            "BLOG_SERVICE_PORT",
            "CORS_ALLOWED_ORIGINS",
            "DATABASE_URL",
            "DATABASE_MAX_CONNECTIONS",
            "JWT_PRIVATE_KEY_PEM",
            "JWT_PUBLIC_KEY_PEM",
        ] {
            std::env::remove_var(key);
        }
    }

    fn set_required_env() {
        std::env::set_var("JWT_PRIVATE_KEY_PEM", "test-private-pem");
        std::env::set_var("JWT_PUBLIC_KEY_PEM", "test-public-pem");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        set_required_env();

        let config = Config::from_env().expect("config should load");
        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.cors.allowed_origins, "http://localhost:3000");
    }

    #[test]
    #[serial]
    fn test_missing_jwt_keys_rejected() {
        clear_env();

        let err = Config::from_env().unwrap_err();
        assert!(err.contains("JWT_PRIVATE_KEY_PEM"));
    }

    #[test]
    #[serial]
    fn test_production_requires_cors_origins() {
        clear_env();
        set_required_env();
        std::env::set_var("APP_ENV", "production");

        let err = Config::from_env().unwrap_err();
        assert!(err.contains("CORS_ALLOWED_ORIGINS"));

        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        let err = Config::from_env().unwrap_err();
        assert!(err.contains("cannot be '*'"));

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://blog.example.com");
        let config = Config::from_env().expect("config should load");
        assert_eq!(config.cors.allowed_origins, "https://blog.example.com");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_port_override() {
        clear_env();
        set_required_env();
        std::env::set_var("BLOG_SERVICE_PORT", "9000");

        let config = Config::from_env().expect("config should load");
        assert_eq!(config.app.port, 9000);
        clear_env();
    }
}
