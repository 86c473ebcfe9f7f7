use thiserror::Error;

#[derive(Debug, Error)]
pub enum SavorlyError {
    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Health check error: {0}")]
    HealthCheck(String),
}

impl From<SavorlyError> for String {
    fn from(err: SavorlyError) -> Self {
        err.to_string()
    }
}
