use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("job {id} is scheduled but JOB_{id}_WHAT is not set")]
    MissingCommand { id: u32 },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email address error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("email build error: {0}")]
    Email(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
