use crate::RemoteError;
use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: SecretString,
    pub base_url: String,
    pub table: String,
}

impl Config {
    pub fn from_env() -> Result<Self, RemoteError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, RemoteError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api = get("NUTRILOG_FAVORITES_API_KEY")
            .ok_or_else(|| RemoteError::Config("NUTRILOG_FAVORITES_API_KEY missing".into()))?;
        let base_url = get("NUTRILOG_FAVORITES_BASE_URL")
            .ok_or_else(|| RemoteError::Config("NUTRILOG_FAVORITES_BASE_URL missing".into()))?;
        let table = get("NUTRILOG_FAVORITES_TABLE").unwrap_or_else(|| "favorite_places".into());
        Ok(Self {
            api_key: SecretString::new(api.into()),
            base_url,
            table,
        })
    }
}
