use super::PlayerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }

    /// New roster member with a generated id.
    pub fn with_generated_id(name: impl Into<String>) -> Self {
        Self { id: PlayerId::generate(), name: name.into() }
    }
}
