use serde::Serialize;

/// Result document for one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Whether anything changed (or would have, in dry-run).
    pub changed: bool,
    /// A user was created.
    pub user_added: bool,
    /// At least one group was created.
    pub group_added: bool,
    /// A user was dropped.
    pub user_removed: bool,
    /// At least one group was dropped.
    pub group_removed: bool,
    /// Resolved user name, empty when none was given.
    pub user: String,
    /// Resolved group names.
    pub group: Vec<String>,
}

impl ReconcileOutcome {
    /// Creates an unchanged outcome echoing the resolved names.
    #[must_use]
    pub fn unchanged(user: impl Into<String>, group: Vec<String>) -> Self {
        Self {
            user: user.into(),
            group,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReconcileOutcome;

    #[test]
    fn outcome_serializes_flat_document() {
        let mut outcome = ReconcileOutcome::unchanged("bob", vec!["etl".to_owned()]);
        outcome.changed = true;
        outcome.user_added = true;

        let document = serde_json::to_value(&outcome).unwrap_or_default();
        assert_eq!(
            document,
            serde_json::json!({
                "changed": true,
                "user_added": true,
                "group_added": false,
                "user_removed": false,
                "group_removed": false,
                "user": "bob",
                "group": ["etl"],
            })
        );
    }
}
