use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("Invalid world configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, WorldError>;
