//! Domain types and invariants for principal reconciliation.

#![forbid(unsafe_code)]

mod desired_state;
mod flag;
mod membership;
mod outcome;
mod principal;
mod privilege;
mod vocabulary;

pub use desired_state::{DesiredState, ResolvedState, TargetState};
pub use flag::CapabilityFlag;
pub use membership::{MembershipDiff, parse_member_list};
pub use outcome::ReconcileOutcome;
pub use principal::{
    ConnectionLimit, Password, PasswordUpdatePolicy, PrincipalRecord, UserAttributes, ValidUntil,
};
pub use privilege::{
    ALL_TABLES_SENTINEL, GrantTarget, ParsedPrivileges, PrivilegeList, SchemaPrivileges,
    TableTarget,
};
pub use vocabulary::{PrivilegeScope, Vocabulary};
