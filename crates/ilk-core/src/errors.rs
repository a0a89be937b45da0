/// Core error type for the issue linker.
///
/// Adapter crates should map their specific errors into this type so the hooks
/// can handle failures consistently (log and keep serving).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
