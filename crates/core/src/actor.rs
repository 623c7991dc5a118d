use serde::{Deserialize, Serialize};

/// Authenticated caller identity.
///
/// Authentication itself happens upstream (session cookie, reverse proxy);
/// this type only carries what the rest of the system needs to authorize an
/// operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    /// Whether the identity layer granted moderation rights.
    pub moderator: bool,
}

impl Actor {
    #[must_use]
    pub const fn user(id: i64) -> Self {
        Self { id, moderator: false }
    }

    #[must_use]
    pub const fn moderator(id: i64) -> Self {
        Self { id, moderator: true }
    }
}
