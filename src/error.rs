// Error taxonomy for the reservation core

use thiserror::Error;

// Failures surfaced by the transport collaborator. Network, HTTP and
// deserialization problems all end up here; the core never retries them
// on its own (manual refresh is the retry mechanism).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("malformed response: {0}")]
    Deserialize(String),

    #[error("authorization rejected")]
    Unauthorized,
}

impl TransportError {
    // True when the failure means the session token is no longer accepted.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TransportError::Unauthorized)
            || matches!(self, TransportError::Http { status: 401 | 403, .. })
    }
}

// Local validation failures. These never reach the network; the operation
// simply does not proceed and the caller is informed synchronously.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no hostel or service selected")]
    MissingTarget,

    #[error("no date selected")]
    MissingDate,

    #[error("party is empty")]
    EmptyParty,

    #[error("an individual reservation must hold exactly one person, got {0}")]
    IndividualPartySize(u32),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    // An authenticated call was rejected for authorization reasons; the
    // whole app returns to NoSession rather than parking the error in the
    // originating cache.
    #[error("session expired")]
    SessionExpired,

    #[error("{0} already in progress")]
    AlreadyInProgress(&'static str),

    #[error("{op} is not allowed in the current session phase")]
    InvalidSessionPhase { op: &'static str },

    #[error("a reservation in status {0} cannot be cancelled")]
    NotCancellable(String),
}
