//! Aggregated user details.

use std::collections::BTreeSet;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authority::GrantedAuthority;
use crate::identity::UserIdentity;
use crate::subject::Subject;

/// The aggregate view of a subject attached to a session token.
///
/// Collects every linked identity, the attribute sets, and the authority
/// snapshot for the subject. Built once per successful authentication; the
/// authority snapshot is immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetails {
    /// Subject identifier.
    pub subject_id: Uuid,
    /// Realm of the session.
    pub realm: String,
    /// Username of the subject.
    pub username: String,
    /// All identities linked to the subject across providers.
    pub identities: Vec<UserIdentity>,
    /// Attribute sets collected from attribute providers.
    pub attributes: HashMap<String, serde_json::Value>,
    /// Authorities granted to the subject.
    authorities: BTreeSet<GrantedAuthority>,
}

impl UserDetails {
    /// Creates user details for a subject with the given authorities.
    #[must_use]
    pub fn new(subject: &Subject, authorities: BTreeSet<GrantedAuthority>) -> Self {
        Self {
            subject_id: subject.subject_id,
            realm: subject.realm.clone(),
            username: subject.username.clone(),
            identities: Vec::new(),
            attributes: HashMap::new(),
            authorities,
        }
    }

    /// Adds a linked identity.
    pub fn add_identity(&mut self, identity: UserIdentity) {
        self.identities.push(identity);
    }

    /// Merges an attribute set, last write wins per key.
    pub fn add_attributes(&mut self, attributes: HashMap<String, serde_json::Value>) {
        self.attributes.extend(attributes);
    }

    /// Returns the authority snapshot.
    #[must_use]
    pub const fn authorities(&self) -> &BTreeSet<GrantedAuthority> {
        &self.authorities
    }

    /// Checks whether an authority is granted.
    #[must_use]
    pub fn has_authority(&self, authority: &GrantedAuthority) -> bool {
        self.authorities.contains(authority)
    }

    /// Erases credentials from every linked identity.
    pub fn erase_credentials(&mut self) {
        for identity in &mut self.identities {
            identity.erase_credentials();
        }
    }
}
