//! Binds a comma separated recipients field to a [`RecipientSet`].

use super::FormValue;
use crate::error::{Error, Result};
use crate::identity::{IdentityConverter, RecipientSet, UserIdentity};

const SEPARATOR: char = ',';
const JOINER: &str = ", ";

pub struct RecipientsConverter<C> {
    identity_converter: C,
}

impl<C: IdentityConverter> RecipientsConverter<C> {
    pub fn new(identity_converter: C) -> Self {
        Self { identity_converter }
    }

    /// Renders model data into the text shown in the form field.
    pub fn forward(&self, value: &FormValue) -> Result<String> {
        match value {
            FormValue::Null => Ok(String::new()),
            FormValue::Identities(identities) => Ok(self.to_text(identities)),
            other => Err(Error::InvalidInputKind {
                expected: "list of identities",
                found: other.kind(),
            }),
        }
    }

    /// Binds submitted text back to recipients. `None` means the field was
    /// left blank, which is not the same as an empty set.
    pub fn reverse(&self, value: &FormValue) -> Result<Option<RecipientSet>> {
        match value {
            FormValue::Null => Ok(None),
            FormValue::Text(text) => self.from_text(text),
            other => Err(Error::InvalidInputKind {
                expected: "string",
                found: other.kind(),
            }),
        }
    }

    pub fn to_text(&self, identities: &[UserIdentity]) -> String {
        identities
            .iter()
            .map(|identity| self.identity_converter.forward(identity))
            .collect::<Vec<_>>()
            .join(JOINER)
    }

    pub fn from_text(&self, text: &str) -> Result<Option<RecipientSet>> {
        if text.is_empty() {
            return Ok(None);
        }

        let mut recipients = RecipientSet::new();
        for segment in text.split(SEPARATOR).filter(|s| !s.is_empty()) {
            let username = segment.trim();
            match self.identity_converter.reverse(username)? {
                Some(identity) => recipients.add(identity),
                None => {
                    log::debug!("Unresolved recipient segment: '{}'", username);
                    return Err(Error::UnresolvedRecipient(username.to_string()));
                }
            }
        }

        Ok(Some(recipients))
    }
}
