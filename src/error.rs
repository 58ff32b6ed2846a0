use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Codec error: {0}")]
    Codec(#[from] exr::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("No input files to read")]
    NoInputFiles,

    #[error("Unknown result label: {0}")]
    UnknownLabel(String),

    #[error("Region buffer mismatch: {0}")]
    RegionBuffer(String),
}

pub type Result<T> = std::result::Result<T, ProfileError>;
