use thiserror::Error;

/// Ways a word fetch can fail. The display text doubles as fallback
/// content, so every message is a short non-empty phrase.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WordSourceError {
    #[error("{0}")]
    Transport(String),

    #[error("Network response was not ok")]
    Status(u16),

    #[error("Could not read word list: {0}")]
    Decode(String),

    #[error("Word provider returned no words")]
    Empty,
}

impl From<reqwest::Error> for WordSourceError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("results log io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("results log csv error: {0}")]
    Csv(#[from] csv::Error),
}
