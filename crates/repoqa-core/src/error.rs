use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scorer returned a score vector that does not line up with the corpus.
    #[error("Misaligned score vector from {scorer}: expected {expected} scores, got {actual}")]
    MisalignedScores { scorer: &'static str, expected: usize, actual: usize },

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
