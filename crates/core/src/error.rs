use thiserror::Error;

/// Input rejected before anything is written.
///
/// Carries the message shown to the client verbatim, so construction sites
/// phrase it in user terms ("Each question must have text") rather than in
/// implementation terms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
