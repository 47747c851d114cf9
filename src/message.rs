use crate::identity::{RecipientSet, UserIdentity};
use serde::{Deserialize, Serialize};

/// A drafted message that opens a new thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewThreadMessage {
    pub sender: UserIdentity,
    pub recipients: RecipientSet,
    pub subject: String,
    pub body: String,
}

impl NewThreadMessage {
    /// Subject and body joined and lowercased, for content matching.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.subject, self.body).to_lowercase()
    }
}
