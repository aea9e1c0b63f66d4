use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rolesync_core::{AppError, AppResult, Identifier};
use rolesync_domain::{
    CapabilityFlag, GrantTarget, PrincipalRecord, PrivilegeList, TableTarget, UserAttributes,
};

use crate::{
    CatalogSession, GroupMembers, GroupRepository, PrincipalRepository, PrivilegeRepository,
};

#[derive(Debug, Clone)]
pub(crate) struct FakeUser {
    pub record: PrincipalRecord,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CatalogState {
    pub users: BTreeMap<String, FakeUser>,
    pub groups: BTreeMap<String, BTreeSet<i64>>,
    pub grants: BTreeSet<(String, String, String)>,
    next_sysid: i64,
}

impl CatalogState {
    pub fn with_user(mut self, name: &str) -> Self {
        let sysid = self.allocate_sysid();
        self.users.insert(
            name.to_owned(),
            FakeUser {
                record: PrincipalRecord {
                    name: name.to_owned(),
                    sysid,
                    can_create_db: false,
                    is_superuser: false,
                    can_update_catalog: false,
                    valid_until: None,
                    connection_limit: None,
                },
                password: Some("initial".to_owned()),
            },
        );
        self
    }

    pub fn with_group(mut self, name: &str, members: &[&str]) -> Self {
        let ids = members
            .iter()
            .filter_map(|member| self.users.get(*member).map(|user| user.record.sysid))
            .collect();
        self.groups.insert(name.to_owned(), ids);
        self
    }

    pub fn groups_of(&self, user: &str) -> BTreeSet<String> {
        let Some(sysid) = self.users.get(user).map(|user| user.record.sysid) else {
            return BTreeSet::new();
        };

        self.groups
            .iter()
            .filter(|(_, members)| members.contains(&sysid))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn allocate_sysid(&mut self) -> i64 {
        self.next_sysid += 1;
        100 + self.next_sysid
    }
}

#[derive(Default)]
pub(crate) struct FakeCatalog {
    pub committed: Mutex<CatalogState>,
    pub statements: Mutex<Vec<String>>,
    pub commits: Mutex<u32>,
    pub rollbacks: Mutex<u32>,
    fail_on: Option<String>,
}

impl FakeCatalog {
    pub fn new(state: CatalogState) -> Arc<Self> {
        Arc::new(Self {
            committed: Mutex::new(state),
            ..Self::default()
        })
    }

    pub fn failing_on(state: CatalogState, statement_prefix: &str) -> Arc<Self> {
        Arc::new(Self {
            committed: Mutex::new(state),
            fail_on: Some(statement_prefix.to_owned()),
            ..Self::default()
        })
    }

    pub async fn session(self: &Arc<Self>) -> FakeSession {
        FakeSession {
            catalog: Arc::clone(self),
            working: self.committed.lock().await.clone(),
        }
    }

    pub async fn boxed_session(self: &Arc<Self>) -> Box<dyn CatalogSession> {
        Box::new(self.session().await)
    }

    pub async fn statements(&self) -> Vec<String> {
        self.statements.lock().await.clone()
    }

    pub async fn writes(&self) -> Vec<String> {
        self.statements
            .lock()
            .await
            .iter()
            .filter(|statement| !statement.starts_with("SELECT"))
            .cloned()
            .collect()
    }

    pub async fn position(&self, statement: &str) -> Option<usize> {
        self.statements
            .lock()
            .await
            .iter()
            .position(|recorded| recorded == statement)
    }
}

pub(crate) struct FakeSession {
    catalog: Arc<FakeCatalog>,
    pub working: CatalogState,
}

impl FakeSession {
    async fn record(&self, statement: String) -> AppResult<()> {
        let fails = self
            .catalog
            .fail_on
            .as_deref()
            .is_some_and(|prefix| statement.starts_with(prefix));
        self.catalog.statements.lock().await.push(statement.clone());

        if fails {
            return Err(AppError::Database(format!("injected failure for '{statement}'")));
        }

        Ok(())
    }

    fn user_sysid(&self, name: &Identifier) -> AppResult<i64> {
        self.working
            .users
            .get(name.as_str())
            .map(|user| user.record.sysid)
            .ok_or_else(|| AppError::Database(format!("user \"{name}\" does not exist")))
    }

    fn group_mut(&mut self, name: &Identifier) -> AppResult<&mut BTreeSet<i64>> {
        self.working
            .groups
            .get_mut(name.as_str())
            .ok_or_else(|| AppError::Database(format!("group \"{name}\" does not exist")))
    }
}

fn render_user_statement(verb: &str, name: &Identifier, attributes: &UserAttributes) -> String {
    let mut statement = format!("{verb} USER {name}");
    if attributes.password.is_some() {
        statement.push_str(" WITH PASSWORD ***");
    }
    if let Some(valid_until) = attributes.valid_until {
        statement.push_str(format!(" VALID UNTIL {}", valid_until.to_sql()).as_str());
    }
    if let Some(limit) = attributes.connection_limit {
        statement.push_str(format!(" CONNECTION LIMIT {}", limit.to_sql()).as_str());
    }
    for flag in &attributes.flags {
        statement.push(' ');
        statement.push_str(flag.as_sql());
    }
    statement
}

fn apply_attributes(user: &mut FakeUser, attributes: &UserAttributes) {
    if let Some(password) = &attributes.password {
        user.password = Some(password.expose().to_owned());
    }
    if let Some(valid_until) = attributes.valid_until {
        user.record.valid_until = Some(valid_until.to_sql());
    }
    if let Some(limit) = attributes.connection_limit {
        user.record.connection_limit = Some(limit.to_sql());
    }
    for flag in &attributes.flags {
        match flag {
            CapabilityFlag::CreateUser => user.record.is_superuser = true,
            CapabilityFlag::NoCreateUser => user.record.is_superuser = false,
            CapabilityFlag::CreateDb => user.record.can_create_db = true,
            CapabilityFlag::NoCreateDb => user.record.can_create_db = false,
        }
    }
}

fn grantee(target: &GrantTarget) -> String {
    match target {
        GrantTarget::User(user) => user.as_str().to_owned(),
        GrantTarget::Group(group) => format!("GROUP {group}"),
    }
}

#[async_trait]
impl PrincipalRepository for FakeSession {
    async fn find_user(&mut self, name: &Identifier) -> AppResult<Option<PrincipalRecord>> {
        self.record(format!("SELECT user {name}")).await?;
        Ok(self
            .working
            .users
            .get(name.as_str())
            .map(|user| user.record.clone()))
    }

    async fn create_user(
        &mut self,
        name: &Identifier,
        attributes: &UserAttributes,
    ) -> AppResult<()> {
        self.record(render_user_statement("CREATE", name, attributes))
            .await?;
        if self.working.users.contains_key(name.as_str()) {
            return Err(AppError::Database(format!("user \"{name}\" already exists")));
        }

        self.working = std::mem::take(&mut self.working).with_user(name.as_str());
        if let Some(user) = self.working.users.get_mut(name.as_str()) {
            user.password = None;
            apply_attributes(user, attributes);
        }
        Ok(())
    }

    async fn alter_user(
        &mut self,
        name: &Identifier,
        attributes: &UserAttributes,
    ) -> AppResult<()> {
        self.record(render_user_statement("ALTER", name, attributes))
            .await?;
        let Some(user) = self.working.users.get_mut(name.as_str()) else {
            return Err(AppError::Database(format!("user \"{name}\" does not exist")));
        };

        apply_attributes(user, attributes);
        Ok(())
    }

    async fn drop_user(&mut self, name: &Identifier) -> AppResult<()> {
        self.record(format!("DROP USER {name}")).await?;
        let sysid = self.user_sysid(name)?;

        if let Some((group, _)) = self
            .working
            .groups
            .iter()
            .find(|(_, members)| members.contains(&sysid))
        {
            return Err(AppError::Database(format!(
                "user \"{name}\" cannot be dropped while a member of group \"{group}\""
            )));
        }

        self.working.users.remove(name.as_str());
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for FakeSession {
    async fn group_exists(&mut self, name: &Identifier) -> AppResult<bool> {
        self.record(format!("SELECT group {name}")).await?;
        Ok(self.working.groups.contains_key(name.as_str()))
    }

    async fn create_group(&mut self, name: &Identifier) -> AppResult<()> {
        self.record(format!("CREATE GROUP {name}")).await?;
        if self.working.groups.contains_key(name.as_str()) {
            return Err(AppError::Database(format!("group \"{name}\" already exists")));
        }

        self.working
            .groups
            .insert(name.as_str().to_owned(), BTreeSet::new());
        Ok(())
    }

    async fn drop_group(&mut self, name: &Identifier) -> AppResult<()> {
        self.record(format!("DROP GROUP {name}")).await?;
        if self.working.groups.remove(name.as_str()).is_none() {
            return Err(AppError::Database(format!("group \"{name}\" does not exist")));
        }
        Ok(())
    }

    async fn list_group_members(&mut self) -> AppResult<Vec<GroupMembers>> {
        self.record("SELECT group members".to_owned()).await?;
        Ok(self
            .working
            .groups
            .iter()
            .map(|(name, members)| GroupMembers {
                name: name.clone(),
                members: members.clone(),
            })
            .collect())
    }

    async fn add_user_to_group(&mut self, group: &Identifier, user: &Identifier) -> AppResult<()> {
        self.record(format!("ALTER GROUP {group} ADD USER {user}"))
            .await?;
        let sysid = self.user_sysid(user)?;
        self.group_mut(group)?.insert(sysid);
        Ok(())
    }

    async fn drop_user_from_group(
        &mut self,
        group: &Identifier,
        user: &Identifier,
    ) -> AppResult<()> {
        self.record(format!("ALTER GROUP {group} DROP USER {user}"))
            .await?;
        let sysid = self.user_sysid(user)?;
        self.group_mut(group)?.remove(&sysid);
        Ok(())
    }
}

#[async_trait]
impl PrivilegeRepository for FakeSession {
    async fn revoke_all_on_schema(
        &mut self,
        schema: &Identifier,
        target: &GrantTarget,
    ) -> AppResult<()> {
        let grantee = grantee(target);
        self.record(format!("REVOKE ALL ON SCHEMA {schema} FROM {grantee}"))
            .await?;
        let object = format!("SCHEMA {schema}");
        self.working
            .grants
            .retain(|(stored_grantee, stored_object, _)| {
                !(stored_grantee == &grantee && stored_object == &object)
            });
        Ok(())
    }

    async fn revoke_all_on_all_tables(
        &mut self,
        schema: &Identifier,
        target: &GrantTarget,
    ) -> AppResult<()> {
        let grantee = grantee(target);
        self.record(format!(
            "REVOKE ALL ON ALL TABLES IN SCHEMA {schema} FROM {grantee}"
        ))
        .await?;
        let table_prefix = format!("TABLE {schema}.");
        let all_tables = format!("ALL TABLES IN SCHEMA {schema}");
        self.working
            .grants
            .retain(|(stored_grantee, stored_object, _)| {
                !(stored_grantee == &grantee
                    && (stored_object.starts_with(table_prefix.as_str())
                        || stored_object == &all_tables))
            });
        Ok(())
    }

    async fn grant_on_schema(
        &mut self,
        privileges: &PrivilegeList,
        schema: &Identifier,
        target: &GrantTarget,
    ) -> AppResult<()> {
        let grantee = grantee(target);
        self.record(format!(
            "GRANT {} ON SCHEMA {schema} TO {grantee}",
            privileges.to_sql()
        ))
        .await?;
        self.working
            .grants
            .insert((grantee, format!("SCHEMA {schema}"), privileges.to_sql()));
        Ok(())
    }

    async fn grant_on_tables(
        &mut self,
        privileges: &PrivilegeList,
        schema: &Identifier,
        table: &TableTarget,
        target: &GrantTarget,
    ) -> AppResult<()> {
        let grantee = grantee(target);
        let object = match table {
            TableTarget::AllTables => format!("ALL TABLES IN SCHEMA {schema}"),
            TableTarget::Table(table) => format!("TABLE {schema}.{table}"),
        };
        self.record(format!(
            "GRANT {} ON {object} TO {grantee}",
            privileges.to_sql()
        ))
        .await?;
        self.working
            .grants
            .insert((grantee, object, privileges.to_sql()));
        Ok(())
    }
}

#[async_trait]
impl CatalogSession for FakeSession {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        *self.catalog.committed.lock().await = self.working.clone();
        *self.catalog.commits.lock().await += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        *self.catalog.rollbacks.lock().await += 1;
        Ok(())
    }
}
