use super::group::DEFAULT_GROUP_ID;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self >= Role::Admin
    }

    pub fn is_superadmin(self) -> bool {
        self == Role::Superadmin
    }
}

#[derive(Debug, Clone)]
pub struct Consultation {
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub groups: Vec<String>,
}

/// Multi-step input the user is in the middle of. The next plain text
/// message is consumed by whichever step is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Conversation {
    #[default]
    None,
    AwaitingSecret(Role),
    AwaitingGroupName,
    AwaitingGroupId {
        name: String,
    },
    AwaitingConsultation,
}

/// Scratch state of a broadcast being composed.
///
/// `publish_mode` and `pending_message` are only ever set together with an
/// active composition; [`PublishDraft::clear`] resets all of it at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishDraft {
    pub publish_mode: bool,
    pub pending_message: Option<String>,
    pub pending_target: Option<String>,
}

impl PublishDraft {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    id: UserId,
    role: Role,
    groups: BTreeSet<String>,
    pub contact: Option<String>,
    consultations: Vec<Consultation>,
    pub draft: PublishDraft,
    pub conversation: Conversation,
}

impl UserRecord {
    pub(crate) fn new(id: UserId) -> Self {
        Self {
            id,
            role: Role::User,
            groups: BTreeSet::from([DEFAULT_GROUP_ID.to_string()]),
            contact: None,
            consultations: Vec::new(),
            draft: PublishDraft::default(),
            conversation: Conversation::None,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    pub fn is_subscribed(&self, group_id: &str) -> bool {
        self.groups.contains(group_id)
    }

    pub fn consultations(&self) -> &[Consultation] {
        &self.consultations
    }

    pub(crate) fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub(crate) fn add_group(&mut self, group_id: &str) -> bool {
        self.groups.insert(group_id.to_string())
    }

    pub(crate) fn push_consultation(&mut self, consultation: Consultation) {
        self.consultations.push(consultation);
    }
}
