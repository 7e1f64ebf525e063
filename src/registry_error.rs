use thiserror::Error;

/// Errors returned when reading a counter value back out of a moniker.
///
/// Registry operations themselves never fail; only diagnostic parsing does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonikerError {
    #[error("Moniker has no counter token")]
    Empty,
    #[error("Invalid counter token in moniker: {token:?}")]
    InvalidCounter { token: String },
}
