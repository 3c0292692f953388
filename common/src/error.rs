use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ShapingError {
    /// A profile document is missing `up`/`down`, or `content` under the named encoding.
    #[error("invalid shaping profile: {0}")]
    InvalidProfile(String),

    /// The service could not be reached (refused, DNS, timeout, ...).
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),

    /// The service answered with a status outside the accepted set.
    #[error("unexpected response from shaping service: HTTP {status}: {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("invalid address range: {0}")]
    InvalidRange(String),
}

impl ShapingError {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ShapingError::Transport(err.into())
    }
}
