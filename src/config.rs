use anyhow::{Context, Result};

/// Runtime configuration, read once from the environment at startup and
/// carried inside the shared application state. Nothing here is read from
/// `std::env` after boot.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    /// Access-token lifetime in minutes.
    pub jwt_expires_min: i64,
    pub github_client_id: String,
    pub github_client_secret: String,
    pub github_redirect_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            port: optional("PORT", "8000")?,
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expires_min: optional("JWT_EXPIRES_MIN", "15")?,
            github_client_id: required("GITHUB_CLIENT_ID")?,
            github_client_secret: required("GITHUB_CLIENT_SECRET")?,
            github_redirect_url: required("GITHUB_REDIRECT_URL")?,
        })
    }
}

fn required(key: &'static str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{} must be set", key))
}

fn optional<T>(key: &'static str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("Invalid {} value", key))
}

#[cfg(test)]
mod tests {
    use super::optional;

    #[test]
    fn optional_falls_back_to_default() {
        let port: u16 = optional("NEWSWIRE_TEST_UNSET_PORT", "8000").unwrap();
        assert_eq!(port, 8000);
    }

    #[test]
    fn optional_rejects_garbage() {
        std::env::set_var("NEWSWIRE_TEST_BAD_PORT", "not-a-port");
        let result: anyhow::Result<u16> = optional("NEWSWIRE_TEST_BAD_PORT", "8000");
        assert!(result.is_err());
    }
}
