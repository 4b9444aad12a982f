//! Member directory lookup
//!
//! The user-account system itself is an external collaborator; the core only
//! needs a membership tier and a contact address per username.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::{
    error::AppResult,
    models::member::{MemberProfile, MembershipTier},
};

/// Lookup capability supplied by the (out-of-scope) user-account store
#[cfg_attr(test, automock)]
pub trait MemberLookup {
    /// Membership tier for a username; unknown users are Silver
    fn tier(&self, username: &str) -> MembershipTier;

    /// Contact address for a username, if one is on file
    fn contact(&self, username: &str) -> Option<String>;
}

/// Member directory backed by a `username,tier,contact` line file
pub struct FileMemberDirectory {
    members: HashMap<String, MemberProfile>,
}

impl FileMemberDirectory {
    /// Load the directory; a missing file yields an empty directory
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "member directory not found, treating as empty");
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut members = HashMap::new();
        for line in text.lines() {
            let mut fields = line.split(',');
            let username = match fields.next().map(str::trim) {
                Some(u) if !u.is_empty() => u.to_string(),
                _ => continue,
            };
            let tier = fields
                .next()
                .map(MembershipTier::from_label)
                .unwrap_or_default();
            let contact = fields
                .next()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            members.insert(
                username.clone(),
                MemberProfile {
                    username,
                    tier,
                    contact,
                },
            );
        }

        tracing::debug!(count = members.len(), "loaded member directory");
        Ok(Self { members })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl MemberLookup for FileMemberDirectory {
    fn tier(&self, username: &str) -> MembershipTier {
        self.members
            .get(username)
            .map(|m| m.tier)
            .unwrap_or_default()
    }

    fn contact(&self, username: &str) -> Option<String> {
        self.members.get(username).and_then(|m| m.contact.clone())
    }
}
