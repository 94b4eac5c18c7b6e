use thiserror::Error;

/// Failure reading or writing the durable slot.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Database(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage quota exceeded: {size} bytes > {limit} bytes")]
    QuotaExceeded { size: usize, limit: usize },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}
