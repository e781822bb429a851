use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderflowError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unsorted input: tick {index} precedes its predecessor in (date, time) order")]
    UnsortedInput { index: usize },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl OrderflowError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        OrderflowError::InvalidInput(msg.into())
    }

    /// True for errors caused by the tick data itself rather than the environment
    pub fn is_data_error(&self) -> bool {
        matches!(self, OrderflowError::InvalidInput(_) | OrderflowError::UnsortedInput { .. })
    }
}
