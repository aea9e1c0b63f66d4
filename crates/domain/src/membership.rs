//! Group membership sets and diffs.

use std::collections::BTreeSet;

use rolesync_core::{AppError, AppResult};

/// Parses a comma-joined member list (`array_to_string(grolist, ',')`).
///
/// Each token is parsed as a whole user id, so `1` never matches `12` or `21`.
/// A missing or empty list is an empty set.
pub fn parse_member_list(raw: Option<&str>) -> AppResult<BTreeSet<i64>> {
    let Some(raw) = raw else {
        return Ok(BTreeSet::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<i64>().map_err(|error| {
                AppError::Database(format!(
                    "group member list contains invalid user id '{token}': {error}"
                ))
            })
        })
        .collect()
}

/// Group operations needed to move a user from one group set to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    /// Groups to drop the user from, in name order.
    pub to_drop: Vec<String>,
    /// Groups to add the user to, in name order.
    pub to_add: Vec<String>,
}

impl MembershipDiff {
    /// Computes `current - desired` and `desired - current`.
    #[must_use]
    pub fn compute(current: &BTreeSet<String>, desired: &BTreeSet<String>) -> Self {
        Self {
            to_drop: current.difference(desired).cloned().collect(),
            to_add: desired.difference(current).cloned().collect(),
        }
    }

    /// Returns whether the sets already match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_drop.is_empty() && self.to_add.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::{MembershipDiff, parse_member_list};

    fn apply_diff(diff: &MembershipDiff, current: &BTreeSet<String>) -> BTreeSet<String> {
        let mut next = current.clone();
        for group in &diff.to_drop {
            next.remove(group);
        }
        next.extend(diff.to_add.iter().cloned());
        next
    }

    #[test]
    fn member_list_matches_whole_tokens_only() {
        let members = parse_member_list(Some("12,100,7")).unwrap_or_default();

        assert!(members.contains(&12));
        assert!(members.contains(&7));
        assert!(!members.contains(&1));
        assert!(!members.contains(&10));
    }

    #[test]
    fn missing_member_list_is_empty() {
        assert!(parse_member_list(None).unwrap_or_default().is_empty());
        assert!(parse_member_list(Some("")).unwrap_or_default().is_empty());
    }

    #[test]
    fn garbage_member_token_is_reported() {
        assert!(parse_member_list(Some("1,x")).is_err());
    }

    #[test]
    fn diff_drops_extra_and_adds_missing() {
        let current = BTreeSet::from(["a".to_owned(), "b".to_owned()]);
        let desired = BTreeSet::from(["b".to_owned(), "c".to_owned()]);
        let diff = MembershipDiff::compute(&current, &desired);

        assert_eq!(diff.to_drop, vec!["a".to_owned()]);
        assert_eq!(diff.to_add, vec!["c".to_owned()]);
    }

    #[test]
    fn empty_desired_set_drops_everything() {
        let current = BTreeSet::from(["a".to_owned(), "b".to_owned()]);
        let diff = MembershipDiff::compute(&current, &BTreeSet::new());

        assert_eq!(diff.to_drop.len(), 2);
        assert!(diff.to_add.is_empty());
    }

    proptest! {
        #[test]
        fn applying_diff_converges_to_desired(
            current in prop::collection::btree_set("[a-e]", 0..5),
            desired in prop::collection::btree_set("[a-e]", 0..5),
        ) {
            let diff = MembershipDiff::compute(&current, &desired);
            prop_assert_eq!(apply_diff(&diff, &current), desired.clone());
            prop_assert!(MembershipDiff::compute(&desired, &desired).is_empty());
        }

        #[test]
        fn member_list_roundtrips_id_sets(
            ids in prop::collection::btree_set(1_i64..100_000, 0..20),
        ) {
            let joined = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
            prop_assert_eq!(parse_member_list(Some(joined.as_str())).unwrap_or_default(), ids);
        }
    }
}
