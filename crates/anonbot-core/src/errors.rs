/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so handlers can
/// apply the same log-and-drop policy regardless of where a call failed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The platform answered with `ok: false`.
    #[error("{method} failed: {code}")]
    Platform { method: String, code: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn platform(method: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Platform {
            method: method.into(),
            code: code.into(),
        }
    }

    /// Error code suitable for logs: the platform code when there is one.
    pub fn code(&self) -> String {
        match self {
            Self::Platform { code, .. } => code.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
