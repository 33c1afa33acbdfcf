use std::env;

use crate::services::secret_santa::matcher::DEFAULT_MAX_ATTEMPTS;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub app_base_url: String,
    pub secret_santa_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let secret_santa_max_attempts = match env::var("SECRET_SANTA_MAX_ATTEMPTS") {
            Ok(v) => v.parse()?,
            Err(_) => DEFAULT_MAX_ATTEMPTS,
        };
        if secret_santa_max_attempts == 0 {
            anyhow::bail!("SECRET_SANTA_MAX_ATTEMPTS must be greater than 0");
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost".into()),
            secret_santa_max_attempts,
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
