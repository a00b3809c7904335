use epistat::error::EpistatError;
use polars::error::PolarsError;

#[derive(thiserror::Error, Debug)]
pub enum EpistatCliError {
    // When errors are not Send and Sync, can return a generic error
    #[error("Generic error")]
    Generic(#[from] Box<dyn std::error::Error + Send + Sync>),
    #[error("Anyhow error")]
    Anyhow(#[from] anyhow::Error),
    #[error("serde JSON error")]
    SerdeJSONError(#[from] serde_json::Error),
    #[error("polars error")]
    PolarsError(#[from] PolarsError),
    #[error("epistat error")]
    EpistatError(#[from] EpistatError),
    #[error("std IO error")]
    IOError(#[from] std::io::Error),
}

pub type EpistatCliResult<T> = Result<T, EpistatCliError>;
