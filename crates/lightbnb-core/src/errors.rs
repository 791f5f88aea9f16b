use thiserror::Error;

#[derive(Error, Debug)]
pub enum LightbnbError {
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("query rejected: {0}")]
    Rejected(String),
    #[error("row decode failed: {0}")]
    Decode(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for LightbnbError {
    fn from(err: serde_json::Error) -> Self {
        LightbnbError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LightbnbError>;
