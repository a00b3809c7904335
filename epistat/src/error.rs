//! Error types.

#[derive(thiserror::Error, Debug)]
pub enum EpistatError {
    #[error("Wrapped anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
    #[error("Source table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("Malformed source data: {0}")]
    MalformedSource(String),
    #[error("Statistical computation failed: {0}")]
    Computation(String),
    #[error("Wrapped polars error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, EpistatError>;

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_anyhow() {
        let anyhow_error = anyhow!("An anyhow error");
        let epistat_error: EpistatError = anyhow_error.into();
        println!("{epistat_error}");
    }

    #[test]
    fn missing_column_names_table_and_column() {
        let err = EpistatError::MissingColumn {
            table: "cases".into(),
            column: "report_date".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cases") && msg.contains("report_date"));
    }
}
