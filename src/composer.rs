//! Accepts or rejects a submitted "new thread" form.

use crate::error::{Error, Result};
use crate::form::{NewThreadForm, RecipientsConverter};
use crate::identity::{IdentityConverter, UserIdentity};
use crate::message::NewThreadMessage;
use crate::spam::SpamDetector;

pub struct ThreadComposer<C, D> {
    recipients: RecipientsConverter<C>,
    detector: D,
}

impl<C: IdentityConverter, D: SpamDetector> ThreadComposer<C, D> {
    pub fn new(identity_converter: C, detector: D) -> Self {
        Self {
            recipients: RecipientsConverter::new(identity_converter),
            detector,
        }
    }

    pub fn recipients_converter(&self) -> &RecipientsConverter<C> {
        &self.recipients
    }

    /// Binds the form and returns the draft that may be persisted.
    pub fn compose(&self, sender: &UserIdentity, form: &NewThreadForm) -> Result<NewThreadMessage> {
        let recipients = match self.recipients.reverse(&form.recipients)? {
            Some(recipients) if !recipients.is_empty() => recipients,
            _ => return Err(Error::NoRecipients),
        };

        if let Some(me) = recipients.iter().find(|r| r.id == sender.id) {
            return Err(Error::SelfRecipient(me.username.clone()));
        }

        let message = NewThreadMessage {
            sender: sender.clone(),
            recipients,
            subject: form.subject.clone(),
            body: form.body.clone(),
        };

        if self.detector.is_spam(&message) {
            log::info!(
                "Rejecting new thread from {} to {} recipients as spam",
                sender.username,
                message.recipients.len()
            );
            return Err(Error::Spam);
        }

        log::debug!(
            "Accepted new thread from {} to {}",
            sender.username,
            message.recipients.usernames().join(", ")
        );
        Ok(message)
    }
}
