//! Membership directory: who a participant id is, and who is acting.

use crate::models::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Role id on the chat platform (snowflake).
pub type RoleId = u64;

/// How a member is shown in announcements.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DisplayIdentity {
    /// Platform mention form, e.g. `<@1234>`.
    pub mention: String,
    pub name: String,
}

impl DisplayIdentity {
    /// Identity using the platform's `<@id>` mention syntax.
    pub fn member(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            mention: format!("<@{id}>"),
            name: name.into(),
        }
    }
}

/// Resolves participant ids for rendering. Unknown ids return None.
pub trait MembershipDirectory {
    fn resolve(&self, id: ParticipantId) -> Option<DisplayIdentity>;
}

/// Directory backed by a fixed map (tests, or a snapshot taken by the dispatcher).
#[derive(Clone, Debug, Default)]
pub struct StaticDirectory {
    members: HashMap<ParticipantId, DisplayIdentity>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, id: ParticipantId, name: impl Into<String>) -> Self {
        self.insert(id, name);
        self
    }

    pub fn insert(&mut self, id: ParticipantId, name: impl Into<String>) {
        self.members.insert(id, DisplayIdentity::member(id, name));
    }
}

impl MembershipDirectory for StaticDirectory {
    fn resolve(&self, id: ParticipantId) -> Option<DisplayIdentity> {
        self.members.get(&id).cloned()
    }
}

/// The member invoking a command.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

impl Actor {
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role_ids: Vec::new(),
        }
    }

    pub fn with_roles(mut self, role_ids: impl IntoIterator<Item = RoleId>) -> Self {
        self.role_ids.extend(role_ids);
        self
    }
}

/// Admin gate: an actor is an admin if they hold any of the configured roles.
#[derive(Clone, Debug, Default)]
pub struct AdminRoles(HashSet<RoleId>);

impl AdminRoles {
    pub fn new(role_ids: impl IntoIterator<Item = RoleId>) -> Self {
        Self(role_ids.into_iter().collect())
    }

    pub fn is_admin(&self, actor: &Actor) -> bool {
        actor.role_ids.iter().any(|r| self.0.contains(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_needs_a_shared_role() {
        let roles = AdminRoles::new([10, 11]);
        assert!(roles.is_admin(&Actor::new(1, "a").with_roles([3, 11])));
        assert!(!roles.is_admin(&Actor::new(2, "b").with_roles([3])));
        assert!(!AdminRoles::default().is_admin(&Actor::new(3, "c").with_roles([10])));
    }

    #[test]
    fn static_directory_resolves_known_members() {
        let dir = StaticDirectory::new().with_member(5, "Kara");
        assert_eq!(dir.resolve(5).unwrap().mention, "<@5>");
        assert_eq!(dir.resolve(6), None);
    }
}
