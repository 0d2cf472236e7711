/// Core error type for tgecho.
///
/// Adapter crates map their specific errors into this type. Every variant that
/// reaches the relay loop is fatal; recoverable conditions (unclassifiable
/// updates, unrenderable documents) never surface as an `Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("delivery error: {0}")]
    Delivery(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
