use crate::board::Coordinate;

/// Result alias that carries the custom [`SimonError`] type.
pub type Result<T> = std::result::Result<T, SimonError>;

/// Common error type for the core crate.
///
/// A wrong tap is not an error. It is an ordinary game transition handled by
/// the state machine, so nothing here describes gameplay failure.
#[derive(Debug, thiserror::Error)]
pub enum SimonError {
    /// Free-form message for conditions without a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// The game asked for a pattern entry past the end of the fixed pool.
    #[error("pattern index {index} exceeds the pattern pool of {len} entries")]
    PatternExhausted { index: usize, len: usize },
    /// A coordinate does not lie on the configured board.
    #[error("coordinate {coordinate} is outside the {columns}x{rows} board")]
    CoordinateOutOfBounds {
        coordinate: Coordinate,
        columns: u8,
        rows: u8,
    },
    /// Configuration failed validation.
    #[error("config validation error: {0}")]
    Config(String),
    /// Wrapper around JSON (de)serialisation errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl SimonError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for SimonError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SimonError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
