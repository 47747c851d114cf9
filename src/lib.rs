pub mod composer;
pub mod config;
pub mod error;
pub mod form;
pub mod identity;
pub mod message;
pub mod spam;

pub use composer::ThreadComposer;
pub use config::Config;
pub use error::{Error, Result};
pub use form::{FormValue, NewThreadForm, RecipientsConverter};
pub use identity::{
    IdentityConverter, RecipientSet, UserDirectory, UserIdentity, UserProvider, UsernameConverter,
};
pub use message::NewThreadMessage;
pub use spam::{build_detector, NoopSpamDetector, SpamDetector, SpamDetectorConfig};
