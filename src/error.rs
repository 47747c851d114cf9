//! Error types for recipient binding and thread composition.

use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for all conversion, lookup and composition operations.
pub enum Error {
    /// A value of an unsupported shape was handed to a converter.
    #[error("expected argument of type {expected}, got {found}")]
    InvalidInputKind {
        expected: &'static str,
        found: &'static str,
    },
    /// A username segment did not resolve to a known user.
    #[error("recipient \"{0}\" does not exist")]
    UnresolvedRecipient(String),
    /// The user provider failed while looking a name up.
    #[error("user lookup failed: {0}")]
    Lookup(String),
    /// The submitted form named no recipients at all.
    #[error("at least one recipient is required")]
    NoRecipients,
    /// The sender listed themselves as a recipient.
    #[error("cannot send a message to yourself ({0})")]
    SelfRecipient(String),
    /// The spam detector flagged the draft.
    #[error("message rejected as spam")]
    Spam,
    /// A content rule pattern failed to compile.
    #[error("invalid spam pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    /// Two directory entries share the same canonical username.
    #[error("duplicate username in directory: {0}")]
    DuplicateUser(String),
}

/// Result type for recipient-guard operations.
pub type Result<T> = std::result::Result<T, Error>;
