use thiserror::Error;

#[derive(Error, Debug)]
pub enum RatingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No price data for {0}")]
    NoPriceData(String),

    #[error("Missing reference data: {0}")]
    MissingReference(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("API error: {0}")]
    ApiError(String),
}
