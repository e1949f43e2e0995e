use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("face {id} not found")]
    FaceNotFound { id: u64 },

    #[error("invalid face uri: {0}")]
    InvalidUri(String),
}

pub type Result<T> = std::result::Result<T, Error>;
