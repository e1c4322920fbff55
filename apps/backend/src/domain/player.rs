use serde::{Deserialize, Serialize};

/// A connected identity. Created on first connection and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub current_lobby: Option<String>,
}

impl Player {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            current_lobby: None,
        }
    }
}
