use thiserror::Error;

use byte_ring::RingError;

pub type LinkResult<T> = Result<T, LinkError>;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("ring error: {0}")]
    Ring(#[from] RingError),

    #[error("invalid link configuration: {0}")]
    InvalidConfig(&'static str),
}
