//! User identities, recipient sets and the single-identity converter seam.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A message participant as known to the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Lookup token.
    pub id: u64,
    /// Display name, unique per directory.
    pub username: String,
}

impl UserIdentity {
    pub fn new(id: u64, username: &str) -> Self {
        Self {
            id,
            username: username.to_string(),
        }
    }
}

/// Ordered recipients of a message. Order follows the source text and
/// duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientSet(Vec<UserIdentity>);

impl RecipientSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn add(&mut self, identity: UserIdentity) {
        self.0.push(identity);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UserIdentity> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[UserIdentity] {
        &self.0
    }

    pub fn usernames(&self) -> Vec<&str> {
        self.0.iter().map(|u| u.username.as_str()).collect()
    }
}

impl From<Vec<UserIdentity>> for RecipientSet {
    fn from(identities: Vec<UserIdentity>) -> Self {
        Self(identities)
    }
}

impl FromIterator<UserIdentity> for RecipientSet {
    fn from_iter<I: IntoIterator<Item = UserIdentity>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for RecipientSet {
    type Item = UserIdentity;
    type IntoIter = std::vec::IntoIter<UserIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecipientSet {
    type Item = &'a UserIdentity;
    type IntoIter = std::slice::Iter<'a, UserIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Maps one identity to its display name and back.
pub trait IdentityConverter {
    fn forward(&self, identity: &UserIdentity) -> String;

    /// `Ok(None)` means the name is unknown; `Err` is a lookup failure.
    fn reverse(&self, name: &str) -> Result<Option<UserIdentity>>;
}

/// Source of users, normally backed by the authentication subsystem.
pub trait UserProvider {
    fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>>;
}

impl<P: UserProvider + ?Sized> UserProvider for &P {
    fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>> {
        (**self).find_by_username(username)
    }
}

/// Username-based converter over any [`UserProvider`].
pub struct UsernameConverter<P> {
    provider: P,
}

impl<P: UserProvider> UsernameConverter<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: UserProvider> IdentityConverter for UsernameConverter<P> {
    fn forward(&self, identity: &UserIdentity) -> String {
        identity.username.clone()
    }

    fn reverse(&self, name: &str) -> Result<Option<UserIdentity>> {
        if name.is_empty() {
            return Ok(None);
        }
        self.provider.find_by_username(name)
    }
}

/// In-memory user directory keyed by canonical (lowercased) username.
#[derive(Debug, Default, Clone)]
pub struct UserDirectory {
    users: HashMap<String, UserIdentity>,
}

fn canonicalize(username: &str) -> String {
    username.to_lowercase()
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_users<I>(users: I) -> Result<Self>
    where
        I: IntoIterator<Item = UserIdentity>,
    {
        let mut directory = Self::new();
        for user in users {
            directory.insert(user)?;
        }
        Ok(directory)
    }

    pub fn insert(&mut self, user: UserIdentity) -> Result<()> {
        let key = canonicalize(&user.username);
        if self.users.contains_key(&key) {
            return Err(Error::DuplicateUser(user.username));
        }
        self.users.insert(key, user);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserProvider for UserDirectory {
    fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>> {
        let found = self.users.get(&canonicalize(username)).cloned();
        if found.is_none() {
            log::debug!("No user found for username '{}'", username);
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        UserDirectory::from_users(vec![
            UserIdentity::new(1, "alice"),
            UserIdentity::new(2, "Bob"),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let directory = directory();
        let bob = directory.find_by_username("bob").unwrap().unwrap();
        assert_eq!(bob.id, 2);
        assert_eq!(bob.username, "Bob");
        assert!(directory.find_by_username("ALICE").unwrap().is_some());
        assert!(directory.find_by_username("carol").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_usernames_rejected() {
        let result = UserDirectory::from_users(vec![
            UserIdentity::new(1, "alice"),
            UserIdentity::new(7, "Alice"),
        ]);
        assert!(matches!(result, Err(Error::DuplicateUser(name)) if name == "Alice"));
    }

    #[test]
    fn test_username_converter_directions() {
        let directory = directory();
        let converter = UsernameConverter::new(&directory);

        assert_eq!(converter.forward(&UserIdentity::new(9, "zed")), "zed");
        assert_eq!(
            converter.reverse("alice").unwrap(),
            Some(UserIdentity::new(1, "alice"))
        );
        assert_eq!(converter.reverse("").unwrap(), None);
        assert_eq!(converter.reverse("ghost").unwrap(), None);
    }

    #[test]
    fn test_recipient_set_keeps_order_and_duplicates() {
        let set: RecipientSet = vec![
            UserIdentity::new(2, "bob"),
            UserIdentity::new(1, "alice"),
            UserIdentity::new(2, "bob"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 3);
        assert_eq!(set.usernames(), vec!["bob", "alice", "bob"]);
    }
}
