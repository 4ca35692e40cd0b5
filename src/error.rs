use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Zoom must be finite and strictly positive.
    #[error("invalid zoom {0}: must be a finite value greater than zero")]
    InvalidZoom(f32),

    /// Aspect ratio must be finite and strictly positive.
    #[error("invalid aspect ratio {0}: must be a finite value greater than zero")]
    InvalidAspectRatio(f32),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
