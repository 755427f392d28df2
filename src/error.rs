#[derive(Debug, thiserror::Error)]
pub enum FactsError {
    #[error("missing required arguments: {0}")]
    MissingArgument(&'static str),

    #[error("value of {name} must be one of: {choices}, got: {value}")]
    InvalidChoice {
        name: &'static str,
        choices: &'static str,
        value: String,
    },

    #[error("failed to render outcome: {0}")]
    Render(#[from] sonic_rs::Error),
}

pub type FactsResult<T> = Result<T, FactsError>;
