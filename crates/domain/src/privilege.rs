//! Compact privilege specification grammar.
//!
//! ```text
//! spec          := schema_clause ( '/' table_clause )*
//! schema_clause := schema_name [ ':' priv_list ]
//! table_clause  := table_name ':' priv_list
//! ```
//!
//! When table clauses follow, the schema clause must carry the `:` separator
//! (its privilege list may still be empty). The table name `ALL` stands for
//! every table in the schema.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::{Display, Formatter};

use rolesync_core::{AppError, AppResult, Identifier};

use crate::vocabulary::{PrivilegeScope, Vocabulary};

/// Table token that selects every table in a schema.
pub const ALL_TABLES_SENTINEL: &str = "ALL";

/// Validated, upper-cased privilege keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeList(Vec<String>);

impl PrivilegeList {
    pub(crate) fn from_keywords(keywords: Vec<String>) -> Self {
        Self(keywords)
    }

    /// Renders the list for a `GRANT` statement.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.0.join(", ")
    }
}

/// Table selector inside a schema entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableTarget {
    /// Every table in the schema.
    AllTables,
    /// One named table.
    Table(Identifier),
}

impl TableTarget {
    fn parse(token: &str) -> AppResult<Self> {
        if token == ALL_TABLES_SENTINEL {
            return Ok(Self::AllTables);
        }

        Identifier::new(token)
            .map(Self::Table)
            .map_err(|error| AppError::Validation(format!("invalid privilege spec: {error}")))
    }
}

/// Desired privileges for one schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaPrivileges {
    privileges: Option<PrivilegeList>,
    tables: BTreeMap<TableTarget, PrivilegeList>,
}

impl SchemaPrivileges {
    /// Returns the schema-level privileges, if any.
    #[must_use]
    pub fn privileges(&self) -> Option<&PrivilegeList> {
        self.privileges.as_ref()
    }

    /// Returns table-level privileges keyed by table selector.
    #[must_use]
    pub fn tables(&self) -> &BTreeMap<TableTarget, PrivilegeList> {
        &self.tables
    }
}

/// Parsed privilege specifications keyed by schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPrivileges {
    schemas: BTreeMap<Identifier, SchemaPrivileges>,
}

impl ParsedPrivileges {
    /// Parses an ordered sequence of specs.
    ///
    /// A schema named more than once keeps only its last occurrence.
    pub fn parse<S: AsRef<str>>(specs: &[S], vocabulary: &Vocabulary) -> AppResult<Self> {
        let mut schemas = BTreeMap::new();

        for spec in specs {
            let (schema, entry) = parse_spec(spec.as_ref(), vocabulary)?;
            schemas.insert(schema, entry);
        }

        Ok(Self { schemas })
    }

    /// Returns whether no schema was specified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Iterates schemas in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, Identifier, SchemaPrivileges> {
        self.schemas.iter()
    }
}

impl<'a> IntoIterator for &'a ParsedPrivileges {
    type Item = (&'a Identifier, &'a SchemaPrivileges);
    type IntoIter = btree_map::Iter<'a, Identifier, SchemaPrivileges>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn parse_spec(spec: &str, vocabulary: &Vocabulary) -> AppResult<(Identifier, SchemaPrivileges)> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(AppError::Validation(
            "invalid privilege spec: entry must not be empty".to_owned(),
        ));
    }

    let Some((schema_clause, tables_clause)) = spec.split_once('/') else {
        let (schema, privileges) = match spec.split_once(':') {
            Some((schema, privileges)) => (schema, privileges),
            None => (spec, ""),
        };

        return Ok((
            schema_identifier(schema)?,
            SchemaPrivileges {
                privileges: vocabulary.privilege_list(PrivilegeScope::Schema, privileges)?,
                tables: BTreeMap::new(),
            },
        ));
    };

    let Some((schema, privileges)) = schema_clause.split_once(':') else {
        return Err(AppError::Validation(format!(
            "invalid privilege spec '{spec}': expected ':' after schema '{schema_clause}'"
        )));
    };

    let mut tables = BTreeMap::new();
    for table_clause in tables_clause.split('/') {
        let Some((table, table_privileges)) = table_clause.split_once(':') else {
            return Err(AppError::Validation(format!(
                "invalid privilege spec '{spec}': expected ':' after table '{table_clause}'"
            )));
        };

        let Some(table_privileges) =
            vocabulary.privilege_list(PrivilegeScope::Table, table_privileges)?
        else {
            return Err(AppError::Validation(format!(
                "invalid privilege spec '{spec}': table '{table}' has no privileges"
            )));
        };

        tables.insert(TableTarget::parse(table.trim())?, table_privileges);
    }

    Ok((
        schema_identifier(schema)?,
        SchemaPrivileges {
            privileges: vocabulary.privilege_list(PrivilegeScope::Schema, privileges)?,
            tables,
        },
    ))
}

fn schema_identifier(value: &str) -> AppResult<Identifier> {
    Identifier::new(value.trim())
        .map_err(|error| AppError::Validation(format!("invalid privilege spec: {error}")))
}

/// Principal a privilege statement is directed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantTarget {
    /// A single user.
    User(Identifier),
    /// A single group.
    Group(Identifier),
}

impl GrantTarget {
    /// Picks the user when present, otherwise the group.
    #[must_use]
    pub fn resolve(user: Option<&Identifier>, group: Option<&Identifier>) -> Option<Self> {
        match (user, group) {
            (Some(user), _) => Some(Self::User(user.clone())),
            (None, Some(group)) => Some(Self::Group(group.clone())),
            (None, None) => None,
        }
    }

    /// Renders the grantee clause, e.g. `"bob"` or `GROUP "analysts"`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::User(user) => user.quoted(),
            Self::Group(group) => format!("GROUP {}", group.quoted()),
        }
    }
}

impl Display for GrantTarget {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(user) => write!(formatter, "user {user}"),
            Self::Group(group) => write!(formatter, "group {group}"),
        }
    }
}
