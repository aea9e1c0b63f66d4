//! Application services and ports.

#![forbid(unsafe_code)]

mod catalog_ports;
#[cfg(test)]
mod fake_catalog;
mod group_store;
mod membership_resolver;
mod principal_store;
mod privilege_applier;
mod reconcile_service;

pub use catalog_ports::{
    CatalogSession, GroupMembers, GroupRepository, PrincipalRepository, PrivilegeRepository,
};
pub use group_store::GroupStore;
pub use membership_resolver::MembershipResolver;
pub use principal_store::PrincipalStore;
pub use privilege_applier::PrivilegeApplier;
pub use reconcile_service::ReconcileService;
