//! Users and groups as seen by flag targeting.

use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type GroupId = u64;

static ANONYMOUS: User = User {
    id: None,
    username: String::new(),
    is_authenticated: false,
    is_staff: false,
    is_superuser: false,
    groups: Vec::new(),
};

/// The requesting user.
///
/// Anonymous users have no id and never match user or group targeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<UserId>,
    pub username: String,
    pub is_authenticated: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    /// Ids of the groups the user belongs to
    pub groups: Vec<GroupId>,
}

impl User {
    /// An authenticated user with no roles or groups.
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            username: username.into(),
            is_authenticated: true,
            is_staff: false,
            is_superuser: false,
            groups: Vec::new(),
        }
    }

    pub fn anonymous() -> Self {
        ANONYMOUS.clone()
    }

    pub(crate) fn anonymous_ref() -> &'static User {
        &ANONYMOUS
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }

    pub fn with_group(mut self, group: GroupId) -> Self {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
        self
    }

    pub fn in_group(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }
}

impl Default for User {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// A named collection of users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
