pub mod group;
pub mod user;

use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::BTreeMap;
use thiserror::Error;

pub use group::{
    DEFAULT_GROUP_ID, Group, MAX_GROUP_NAME_LEN, is_private_id, is_valid_group_id,
    is_valid_group_name,
};
pub use user::{Consultation, Conversation, PublishDraft, Role, UserId, UserRecord};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("wrong secret")]
    WrongSecret,
    #[error("this action requires the {0:?} role")]
    NotAuthorized(Role),
    #[error("invalid group id '{0}'")]
    InvalidGroupId(String),
    #[error("invalid group name '{0}'")]
    InvalidGroupName(String),
    #[error("group '{0}' already exists")]
    GroupExists(String),
    #[error("already subscribed to '{0}'")]
    AlreadySubscribed(String),
    #[error("no such group '{0}'")]
    NoSuchGroup(String),
}

#[derive(Debug, Clone)]
pub struct Secrets {
    pub admin: String,
    pub superadmin: String,
}

/// In-memory registry of users and subscription groups.
///
/// Everything lives for the lifetime of the process; nothing is persisted.
#[derive(Debug)]
pub struct Directory {
    users: BTreeMap<UserId, UserRecord>,
    groups: Vec<Group>,
    secrets: Secrets,
}

impl Directory {
    pub fn new(secrets: Secrets) -> Self {
        Self {
            users: BTreeMap::new(),
            groups: vec![Group::default_group()],
            secrets,
        }
    }

    /// Returns the record for `id`, creating it on first contact. The flag is
    /// `true` when the record was just created.
    pub fn register_or_get(&mut self, id: UserId) -> (&mut UserRecord, bool) {
        let mut created = false;
        let user = self.users.entry(id).or_insert_with(|| {
            created = true;
            debug!("Registered new user {}", id);
            UserRecord::new(id)
        });
        (user, created)
    }

    pub fn user(&self, id: UserId) -> Option<&UserRecord> {
        self.users.get(&id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut UserRecord> {
        self.users.get_mut(&id)
    }

    pub fn role_of(&self, id: UserId) -> Role {
        self.users.get(&id).map_or(Role::User, UserRecord::role)
    }

    pub fn is_admin(&self, id: UserId) -> bool {
        self.role_of(id).is_admin()
    }

    /// Grants the admin role. An existing admin or superadmin keeps its role.
    pub fn promote_to_admin(&mut self, id: UserId, secret: &str) -> Result<Role, DirectoryError> {
        if secret.trim() != self.secrets.admin {
            return Err(DirectoryError::WrongSecret);
        }
        let (user, _) = self.register_or_get(id);
        if !user.is_admin() {
            user.set_role(Role::Admin);
            info!("User {} promoted to admin", id);
        }
        Ok(user.role())
    }

    /// Grants the superadmin role. Only an admin may ask for it.
    pub fn promote_to_superadmin(
        &mut self,
        id: UserId,
        secret: &str,
    ) -> Result<Role, DirectoryError> {
        if !self.is_admin(id) {
            return Err(DirectoryError::NotAuthorized(Role::Admin));
        }
        if secret.trim() != self.secrets.superadmin {
            return Err(DirectoryError::WrongSecret);
        }
        let (user, _) = self.register_or_get(id);
        user.set_role(Role::Superadmin);
        info!("User {} promoted to superadmin", id);
        Ok(Role::Superadmin)
    }

    pub fn create_group(&mut self, display_name: &str, group_id: &str) -> Result<Group, DirectoryError> {
        if !is_valid_group_name(display_name) {
            return Err(DirectoryError::InvalidGroupName(display_name.to_string()));
        }
        let group_id = group_id.trim();
        if !is_valid_group_id(group_id) {
            return Err(DirectoryError::InvalidGroupId(group_id.to_string()));
        }
        if self.group(group_id).is_some() {
            return Err(DirectoryError::GroupExists(group_id.to_string()));
        }

        let group = Group::new(group_id, display_name.trim());
        self.groups.push(group.clone());
        info!("Group '{}' ({}) created", group.id(), group.name());
        Ok(group)
    }

    pub fn subscribe(&mut self, user_id: UserId, group_id: &str) -> Result<&Group, DirectoryError> {
        let Some(index) = self.groups.iter().position(|g| g.id() == group_id) else {
            return Err(DirectoryError::NoSuchGroup(group_id.to_string()));
        };

        let (user, _) = self.register_or_get(user_id);
        if !user.add_group(group_id) {
            return Err(DirectoryError::AlreadySubscribed(group_id.to_string()));
        }
        debug!("User {} subscribed to '{}'", user_id, group_id);
        Ok(&self.groups[index])
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id() == group_id)
    }

    /// Full catalog in creation order, private groups included.
    pub fn all_groups(&self) -> &[Group] {
        &self.groups
    }

    /// Groups offered in the subscription menus.
    pub fn public_groups(&self) -> Vec<&Group> {
        self.groups.iter().filter(|g| !g.is_private()).collect()
    }

    pub fn superadmins(&self) -> Vec<UserId> {
        self.users
            .values()
            .filter(|u| u.role().is_superadmin())
            .map(UserRecord::id)
            .collect()
    }

    /// Everyone subscribed to `group_id` plus everyone in the default group.
    pub fn recipients(&self, group_id: &str) -> Vec<UserId> {
        self.users
            .values()
            .filter(|u| u.is_subscribed(group_id) || u.is_subscribed(DEFAULT_GROUP_ID))
            .map(UserRecord::id)
            .collect()
    }

    /// Display names of the groups `id` is subscribed to.
    pub fn group_names_of(&self, id: UserId) -> Vec<String> {
        let Some(user) = self.users.get(&id) else {
            return Vec::new();
        };
        self.groups
            .iter()
            .filter(|g| user.is_subscribed(g.id()))
            .map(|g| g.name().to_string())
            .collect()
    }

    pub fn record_consultation(
        &mut self,
        id: UserId,
        description: &str,
        created_at: DateTime<Utc>,
    ) -> Consultation {
        let consultation = Consultation {
            description: description.to_string(),
            created_at,
            groups: self.group_names_of(id),
        };
        let (user, _) = self.register_or_get(id);
        user.push_consultation(consultation.clone());
        consultation
    }

    pub fn set_conversation(&mut self, id: UserId, conversation: Conversation) {
        let (user, _) = self.register_or_get(id);
        user.conversation = conversation;
    }

    pub fn take_conversation(&mut self, id: UserId) -> Conversation {
        self.users
            .get_mut(&id)
            .map(|u| std::mem::take(&mut u.conversation))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Directory {
        Directory::new(Secrets {
            admin: "admin-pass".to_string(),
            superadmin: "root-pass".to_string(),
        })
    }

    #[test]
    fn register_is_idempotent() {
        let mut dir = directory();
        let (_, created) = dir.register_or_get(1);
        assert!(created);
        let (user, created) = dir.register_or_get(1);
        assert!(!created);
        assert!(user.is_subscribed(DEFAULT_GROUP_ID));
    }

    #[test]
    fn admin_promotion_checks_secret() {
        let mut dir = directory();
        assert_eq!(dir.promote_to_admin(1, "nope"), Err(DirectoryError::WrongSecret));
        assert_eq!(dir.role_of(1), Role::User);
        assert_eq!(dir.promote_to_admin(1, "admin-pass"), Ok(Role::Admin));
        assert!(dir.is_admin(1));
    }

    #[test]
    fn superadmin_requires_admin_first() {
        let mut dir = directory();
        dir.register_or_get(2);
        assert_eq!(
            dir.promote_to_superadmin(2, "root-pass"),
            Err(DirectoryError::NotAuthorized(Role::Admin))
        );
        dir.promote_to_admin(2, "admin-pass").unwrap();
        assert_eq!(dir.promote_to_superadmin(2, "admin-pass"), Err(DirectoryError::WrongSecret));
        assert_eq!(dir.promote_to_superadmin(2, "root-pass"), Ok(Role::Superadmin));
        assert_eq!(dir.superadmins(), vec![2]);

        // Re-entering the admin secret never demotes.
        assert_eq!(dir.promote_to_admin(2, "admin-pass"), Ok(Role::Superadmin));
    }

    #[test]
    fn create_group_validation() {
        let mut dir = directory();
        assert_eq!(
            dir.create_group("Bad", "bad id"),
            Err(DirectoryError::InvalidGroupId("bad id".to_string()))
        );
        assert_eq!(
            dir.create_group("Again", "news"),
            Err(DirectoryError::GroupExists("news".to_string()))
        );
        let group = dir.create_group("Events", "events").unwrap();
        assert_eq!(group.name(), "Events");
        assert_eq!(
            dir.create_group("Events 2", "events"),
            Err(DirectoryError::GroupExists("events".to_string()))
        );
        assert_eq!(dir.group("events").map(Group::name), Some("Events"));

        let long_name = "x".repeat(MAX_GROUP_NAME_LEN + 1);
        assert_eq!(
            dir.create_group(&long_name, "long"),
            Err(DirectoryError::InvalidGroupName(long_name.clone()))
        );
        assert!(dir.group("long").is_none());
    }

    #[test]
    fn subscribe_outcomes() {
        let mut dir = directory();
        dir.create_group("Events", "events").unwrap();
        assert!(dir.subscribe(5, "events").is_ok());
        assert_eq!(
            dir.subscribe(5, "events"),
            Err(DirectoryError::AlreadySubscribed("events".to_string()))
        );
        assert_eq!(
            dir.subscribe(5, "news"),
            Err(DirectoryError::AlreadySubscribed("news".to_string()))
        );
        assert_eq!(
            dir.subscribe(5, "missing"),
            Err(DirectoryError::NoSuchGroup("missing".to_string()))
        );
    }

    #[test]
    fn private_groups_hidden_from_public_menu() {
        let mut dir = directory();
        dir.create_group("Events", "events").unwrap();
        dir.create_group("VIP", "vip_private").unwrap();
        let public: Vec<_> = dir.public_groups().iter().map(|g| g.id().to_string()).collect();
        assert_eq!(public, vec!["news", "events"]);
        assert_eq!(dir.all_groups().len(), 3);
    }

    #[test]
    fn recipients_include_default_group() {
        let mut dir = directory();
        dir.create_group("Events", "events").unwrap();
        dir.create_group("Sports", "sports").unwrap();
        dir.register_or_get(1);
        dir.subscribe(2, "events").unwrap();
        dir.subscribe(3, "sports").unwrap();

        // Every user sits in "news", so everyone is reached.
        assert_eq!(dir.recipients("events"), vec![1, 2, 3]);
    }

    #[test]
    fn consultation_captures_group_names() {
        let mut dir = directory();
        dir.create_group("Events", "events").unwrap();
        dir.subscribe(7, "events").unwrap();
        let now = Utc::now();
        let c = dir.record_consultation(7, "Need help", now);
        assert_eq!(c.groups, vec!["News".to_string(), "Events".to_string()]);
        assert_eq!(dir.user(7).unwrap().consultations().len(), 1);
        assert_eq!(dir.user(7).unwrap().consultations()[0].created_at, now);
    }

    #[test]
    fn conversation_is_taken_once() {
        let mut dir = directory();
        dir.set_conversation(3, Conversation::AwaitingGroupName);
        assert_eq!(dir.take_conversation(3), Conversation::AwaitingGroupName);
        assert_eq!(dir.take_conversation(3), Conversation::None);
        assert_eq!(dir.take_conversation(99), Conversation::None);
    }
}
