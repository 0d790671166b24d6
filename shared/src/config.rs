use anyhow::Context;
use dotenv::dotenv;

pub const DEFAULT_SECRET_KEY: &str = "change-this-secret-key-in-production";

#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub app_env: String,
    pub database_url: String,
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub host: String,
    pub port: u16,
    pub secure_cookies: bool,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub static_dir: String,
    pub max_strategies_per_user: u64,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty() && origin != "*")
            .collect();

        Ok(Config {
            app_name: std::env::var("APP_NAME").unwrap_or_else(|_| "Strategy Builder".to_string()),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://strategy_builder.db?mode=rwc".to_string()),
            secret_key: std::env::var("SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string()),
            access_token_expire_minutes: parse_var("ACCESS_TOKEN_EXPIRE_MINUTES", 30)?,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 5001)?,
            secure_cookies: parse_var("SECURE_COOKIES", false)?,
            allowed_origins,
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "api/static".to_string()),
            max_strategies_per_user: parse_var("MAX_STRATEGIES_PER_USER", 50)?,
            log_json: std::env::var("LOG_FORMAT")
                .map(|format| format.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", name, raw)),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_default_and_value() {
        std::env::remove_var("STRATEGY_BUILDER_TEST_UNSET");
        assert_eq!(parse_var("STRATEGY_BUILDER_TEST_UNSET", 30i64).unwrap(), 30);

        std::env::set_var("STRATEGY_BUILDER_TEST_PORT", " 8080 ");
        assert_eq!(parse_var("STRATEGY_BUILDER_TEST_PORT", 5001u16).unwrap(), 8080);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        std::env::set_var("STRATEGY_BUILDER_TEST_LIMIT", "lots");
        let err = parse_var("STRATEGY_BUILDER_TEST_LIMIT", 50u64).unwrap_err();
        assert!(err.to_string().contains("STRATEGY_BUILDER_TEST_LIMIT"));
    }
}
