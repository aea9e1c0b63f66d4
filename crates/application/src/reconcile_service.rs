use std::sync::Arc;

use rolesync_core::AppResult;
use rolesync_domain::{
    DesiredState, PasswordUpdatePolicy, ReconcileOutcome, ResolvedState, TargetState, Vocabulary,
};
use tracing::{info, warn};

use crate::{CatalogSession, GroupStore, MembershipResolver, PrincipalStore, PrivilegeApplier};

/// Converges users, groups, memberships and grants to a desired state inside
/// one transaction.
#[derive(Clone)]
pub struct ReconcileService {
    vocabulary: Arc<Vocabulary>,
}

impl ReconcileService {
    /// Creates a service sharing the process-wide vocabulary.
    #[must_use]
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    /// Runs one reconciliation and owns the session's commit or rollback.
    ///
    /// Input is fully validated before the first statement. Dry-run always
    /// rolls back but reports the outcome that a normal run would have had.
    pub async fn reconcile(
        &self,
        mut session: Box<dyn CatalogSession>,
        desired: &DesiredState,
    ) -> AppResult<ReconcileOutcome> {
        let result = match desired.resolve(&self.vocabulary) {
            Ok(resolved) => match resolved.state {
                TargetState::Present => converge_present(session.as_mut(), &resolved).await,
                TargetState::Absent => converge_absent(session.as_mut(), &resolved).await,
            },
            Err(error) => Err(error),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) => {
                if let Err(rollback_error) = session.rollback().await {
                    warn!(error = %rollback_error, "failed to roll back after error");
                }
                return Err(error);
            }
        };

        if desired.dry_run {
            session.rollback().await?;
            info!(changed = outcome.changed, "dry run, rolled back");
        } else if outcome.changed {
            session.commit().await?;
            info!(
                user_added = outcome.user_added,
                group_added = outcome.group_added,
                user_removed = outcome.user_removed,
                group_removed = outcome.group_removed,
                "committed changes"
            );
        } else {
            session.rollback().await?;
            info!("already converged");
        }

        Ok(outcome)
    }
}

fn initial_outcome(resolved: &ResolvedState) -> ReconcileOutcome {
    ReconcileOutcome::unchanged(
        resolved
            .user
            .as_ref()
            .map(|user| user.as_str().to_owned())
            .unwrap_or_default(),
        resolved
            .groups
            .iter()
            .map(|group| group.as_str().to_owned())
            .collect(),
    )
}

async fn converge_present(
    session: &mut dyn CatalogSession,
    resolved: &ResolvedState,
) -> AppResult<ReconcileOutcome> {
    let mut outcome = initial_outcome(resolved);

    if let Some(user) = &resolved.user {
        let mut principals = PrincipalStore::new(&mut *session);

        if !principals.exists(user.as_str()).await? {
            principals.create(user, &resolved.attributes).await?;
            info!(user = %user, "created user");
            outcome.changed = true;
            outcome.user_added = true;
        } else {
            let mut attributes = resolved.attributes.clone();
            if resolved.update_password == PasswordUpdatePolicy::OnCreate {
                attributes.password = None;
            }
            let rotated = attributes.password.is_some();

            let altered = principals.alter(user, &attributes).await?;
            if altered || rotated {
                info!(user = %user, altered, rotated, "updated user");
                outcome.changed = true;
            }
        }
    } else {
        let mut groups = GroupStore::new(&mut *session);

        for group in &resolved.groups {
            if !groups.exists(group.as_str()).await? {
                groups.create(group).await?;
                info!(group = %group, "created group");
                outcome.changed = true;
                outcome.group_added = true;
            }
        }
    }

    if let Some(user) = &resolved.user
        && !resolved.groups.is_empty()
    {
        let membership_changed = MembershipResolver::new(&mut *session)
            .reconcile(user, &resolved.groups)
            .await?;
        outcome.changed |= membership_changed;
    }

    let mut applier = PrivilegeApplier::new(&mut *session);
    let privileges_applied = match &resolved.user {
        Some(user) => {
            applier
                .apply_for(&resolved.privileges, Some(user), resolved.groups.first())
                .await?
        }
        None => {
            let mut applied = false;
            for group in &resolved.groups {
                applied |= applier
                    .apply_for(&resolved.privileges, None, Some(group))
                    .await?;
            }
            applied
        }
    };
    outcome.changed |= privileges_applied;

    Ok(outcome)
}

async fn converge_absent(
    session: &mut dyn CatalogSession,
    resolved: &ResolvedState,
) -> AppResult<ReconcileOutcome> {
    let mut outcome = initial_outcome(resolved);

    if let Some(user) = &resolved.user {
        if PrincipalStore::new(&mut *session)
            .exists(user.as_str())
            .await?
        {
            MembershipResolver::new(&mut *session)
                .reconcile(user, &[])
                .await?;
            PrincipalStore::new(&mut *session).drop(user).await?;
            info!(user = %user, "dropped user");
            outcome.changed = true;
            outcome.user_removed = true;
        }

        return Ok(outcome);
    }

    let mut groups = GroupStore::new(&mut *session);
    for group in &resolved.groups {
        if groups.exists(group.as_str()).await? {
            groups.drop(group).await?;
            info!(group = %group, "dropped group");
            outcome.changed = true;
            outcome.group_removed = true;
        }
    }

    Ok(outcome)
}
