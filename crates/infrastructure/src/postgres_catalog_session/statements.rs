//! Rendering of catalog DDL and DCL statements.
//!
//! Identifiers arrive pre-validated and are always double-quoted. The password
//! literal is quoted by the server before it reaches these functions.

use rolesync_core::Identifier;
use rolesync_domain::{GrantTarget, PrivilegeList, TableTarget, UserAttributes};

/// Stand-in for the password literal in logged statements.
pub const REDACTED_LITERAL: &str = "'********'";

/// Membership direction for `ALTER GROUP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Add,
    Drop,
}

pub fn create_user(
    name: &Identifier,
    password_literal: &str,
    attributes: &UserAttributes,
) -> String {
    let mut statement = format!(
        "CREATE USER {} WITH PASSWORD {password_literal}",
        name.quoted()
    );
    push_options(&mut statement, attributes);
    statement
}

pub fn alter_user(
    name: &Identifier,
    password_literal: Option<&str>,
    attributes: &UserAttributes,
) -> String {
    let mut statement = format!("ALTER USER {}", name.quoted());
    if let Some(password_literal) = password_literal {
        statement.push_str(" PASSWORD ");
        statement.push_str(password_literal);
    }
    push_options(&mut statement, attributes);
    statement
}

fn push_options(statement: &mut String, attributes: &UserAttributes) {
    for flag in &attributes.flags {
        statement.push(' ');
        statement.push_str(flag.as_sql());
    }

    if let Some(valid_until) = attributes.valid_until {
        statement.push_str(" VALID UNTIL ");
        statement.push_str(valid_until.to_sql().as_str());
    }

    if let Some(limit) = attributes.connection_limit {
        statement.push_str(" CONNECTION LIMIT ");
        statement.push_str(limit.to_sql().as_str());
    }
}

pub fn drop_user(name: &Identifier) -> String {
    format!("DROP USER {}", name.quoted())
}

pub fn create_group(name: &Identifier) -> String {
    format!("CREATE GROUP {}", name.quoted())
}

pub fn drop_group(name: &Identifier) -> String {
    format!("DROP GROUP {}", name.quoted())
}

pub fn alter_group(group: &Identifier, change: MembershipChange, user: &Identifier) -> String {
    let verb = match change {
        MembershipChange::Add => "ADD",
        MembershipChange::Drop => "DROP",
    };
    format!("ALTER GROUP {} {verb} USER {}", group.quoted(), user.quoted())
}

pub fn revoke_all_on_schema(schema: &Identifier, target: &GrantTarget) -> String {
    format!(
        "REVOKE ALL ON SCHEMA {} FROM {}",
        schema.quoted(),
        target.to_sql()
    )
}

pub fn revoke_all_on_all_tables(schema: &Identifier, target: &GrantTarget) -> String {
    format!(
        "REVOKE ALL ON ALL TABLES IN SCHEMA {} FROM {}",
        schema.quoted(),
        target.to_sql()
    )
}

pub fn grant_on_schema(
    privileges: &PrivilegeList,
    schema: &Identifier,
    target: &GrantTarget,
) -> String {
    format!(
        "GRANT {} ON SCHEMA {} TO {}",
        privileges.to_sql(),
        schema.quoted(),
        target.to_sql()
    )
}

pub fn grant_on_tables(
    privileges: &PrivilegeList,
    schema: &Identifier,
    table: &TableTarget,
    target: &GrantTarget,
) -> String {
    let object = match table {
        TableTarget::AllTables => format!("ALL TABLES IN SCHEMA {}", schema.quoted()),
        TableTarget::Table(table) => format!("TABLE {}.{}", schema.quoted(), table.quoted()),
    };
    format!("GRANT {} ON {object} TO {}", privileges.to_sql(), target.to_sql())
}
