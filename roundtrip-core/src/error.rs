use thiserror::Error;

/// A raw transfer field that could not be turned into a typed value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("transfer {hash}: field `{field}` is not an unsigned integer: {value:?}")]
    InvalidInteger {
        hash: String,
        field: &'static str,
        value: String,
    },

    #[error("transfer {hash}: field `{field}` does not fit a decimal amount")]
    AmountOutOfRange { hash: String, field: &'static str },

    #[error("transfer {hash}: timestamp {value} is out of range")]
    InvalidTimestamp { hash: String, value: i64 },
}

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("explorer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("explorer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("explorer action `{action}` failed: {message}")]
    Api { action: &'static str, message: String },

    #[error("explorer action `{action}` returned an unexpected payload: {reason}")]
    Decode { action: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Missing required parameters: address, start_date, end_date")]
    MissingParameters,

    #[error("Invalid date format. Please use YYYY-MM-DD format.")]
    InvalidDate,

    #[error("end_date must not be earlier than start_date")]
    InvalidDateRange,

    #[error("Invalid value for `{name}`: {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Failed to get block numbers for the given time range")]
    BlockLookup(#[source] ExplorerError),

    #[error("Failed to fetch token transfers")]
    TransferListing(#[source] ExplorerError),
}

impl AnalysisError {
    /// Caller-side mistakes, as opposed to upstream failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::MissingParameters
                | AnalysisError::InvalidDate
                | AnalysisError::InvalidDateRange
                | AnalysisError::InvalidNumber { .. }
        )
    }
}
