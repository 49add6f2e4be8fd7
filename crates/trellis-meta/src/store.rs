//! The metadata store.

use crate::keys::{AttributeKey, Member};
use crate::value::MetaValue;
use std::collections::HashMap;

/// Identifies one registered controller instance in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectId(u64);

struct SubjectRecord {
    name: String,
    /// Members in first-touch order; drives route enumeration order.
    members: Vec<Member>,
    entries: HashMap<(Member, AttributeKey), MetaValue>,
}

/// Associative store keyed by `(subject, member, attribute)`.
///
/// Written by the annotation API during registration, read by extraction.
/// Member order is preserved per subject so routes are registered in the
/// order they were declared.
#[derive(Default)]
pub struct MetadataStore {
    next_id: u64,
    subjects: HashMap<SubjectId, SubjectRecord>,
}

impl MetadataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subject (one controller instance) and returns its id.
    pub fn register_subject(&mut self, name: impl Into<String>) -> SubjectId {
        let id = SubjectId(self.next_id);
        self.next_id += 1;
        self.subjects.insert(
            id,
            SubjectRecord {
                name: name.into(),
                members: Vec::new(),
                entries: HashMap::new(),
            },
        );
        id
    }

    /// Returns the display name of a subject.
    #[must_use]
    pub fn subject_name(&self, subject: SubjectId) -> Option<&str> {
        self.subjects.get(&subject).map(|r| r.name.as_str())
    }

    /// Writes a metadata entry. Later writes to the same key replace the
    /// earlier value.
    pub fn insert(
        &mut self,
        subject: SubjectId,
        member: Member,
        attribute: AttributeKey,
        value: MetaValue,
    ) {
        let Some(record) = self.subjects.get_mut(&subject) else {
            tracing::warn!(?subject, "metadata write to unregistered subject dropped");
            return;
        };
        if !record.members.contains(&member) {
            record.members.push(member.clone());
        }
        record.entries.insert((member, attribute), value);
    }

    /// Reads a metadata entry.
    #[must_use]
    pub fn get(
        &self,
        subject: SubjectId,
        member: &Member,
        attribute: AttributeKey,
    ) -> Option<&MetaValue> {
        self.subjects
            .get(&subject)?
            .entries
            .get(&(member.clone(), attribute))
    }

    /// Returns the method members of a subject in declaration order.
    pub fn method_members(&self, subject: SubjectId) -> impl Iterator<Item = &Member> {
        self.subjects
            .get(&subject)
            .map(|r| r.members.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(|m| matches!(m, Member::Method(_)))
    }

    /// Returns whether the subject is registered.
    #[must_use]
    pub fn contains_subject(&self, subject: SubjectId) -> bool {
        self.subjects.contains_key(&subject)
    }
}
