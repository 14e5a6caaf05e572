#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An estimate from the estimation service breaks a domain invariant.
    #[error("Invalid estimate payload: {0}")]
    InvalidPayload(String),
}
