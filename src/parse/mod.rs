pub mod delay;
pub mod position;
pub mod time;

use thiserror::Error;

/// Rejected command-line input. Every variant is fatal: a malformed value is
/// never replaced by a default.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid delay '{input}': delay must be in [#h][#m][#s][#ms] format")]
    InvalidDelayFormat { input: String },

    #[error("invalid time '{input}': time must be in hh[:mm](a|p|am|pm) format")]
    InvalidTimeFormat { input: String },

    #[error("invalid position '{input}': position must be in 'x,y' format")]
    InvalidPositionFormat { input: String },
}

impl ParseError {
    pub(crate) fn delay(input: &str) -> Self {
        Self::InvalidDelayFormat {
            input: input.to_string(),
        }
    }

    pub(crate) fn time(input: &str) -> Self {
        Self::InvalidTimeFormat {
            input: input.to_string(),
        }
    }

    pub(crate) fn position(input: &str) -> Self {
        Self::InvalidPositionFormat {
            input: input.to_string(),
        }
    }
}
