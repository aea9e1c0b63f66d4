use std::collections::BTreeSet;

use async_trait::async_trait;

use rolesync_core::{AppResult, Identifier};

/// Group name together with the user ids it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembers {
    /// Group name as stored.
    pub name: String,
    /// Member user ids.
    pub members: BTreeSet<i64>,
}

/// Repository port for groups and group membership.
#[async_trait]
pub trait GroupRepository: Send {
    /// Returns whether the group exists.
    async fn group_exists(&mut self, name: &Identifier) -> AppResult<bool>;

    /// Issues `CREATE GROUP`.
    async fn create_group(&mut self, name: &Identifier) -> AppResult<()>;

    /// Issues `DROP GROUP`.
    async fn drop_group(&mut self, name: &Identifier) -> AppResult<()>;

    /// Lists every group with its member ids.
    async fn list_group_members(&mut self) -> AppResult<Vec<GroupMembers>>;

    /// Issues `ALTER GROUP ... ADD USER`.
    async fn add_user_to_group(&mut self, group: &Identifier, user: &Identifier) -> AppResult<()>;

    /// Issues `ALTER GROUP ... DROP USER`.
    async fn drop_user_from_group(&mut self, group: &Identifier, user: &Identifier)
    -> AppResult<()>;
}
