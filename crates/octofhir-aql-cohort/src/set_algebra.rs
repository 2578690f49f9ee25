//! Set operations over subject identifiers

use crate::{CohortError, CohortResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A set of opaque subject identifiers
pub type IdentifierSet = BTreeSet<String>;

/// Operator of a cohort group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SetOperator {
    And,
    Or,
    Not,
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        })
    }
}

/// Ids present in every set; empty when there are no sets
pub fn intersect(sets: &[IdentifierSet]) -> IdentifierSet {
    let Some(smallest) = sets.iter().min_by_key(|set| set.len()) else {
        return IdentifierSet::new();
    };
    smallest
        .iter()
        .filter(|id| sets.iter().all(|set| set.contains(*id)))
        .cloned()
        .collect()
}

/// Ids present in at least one set
pub fn union(sets: &[IdentifierSet]) -> IdentifierSet {
    sets.iter().flatten().cloned().collect()
}

/// `universe` minus `set`.
///
/// Fails when either side is empty, so a malformed NOT never yields every
/// known subject.
pub fn complement(universe: &IdentifierSet, set: &IdentifierSet) -> CohortResult<IdentifierSet> {
    if universe.is_empty() {
        return Err(CohortError::invalid_operands("NOT requires a non-empty universe"));
    }
    if set.is_empty() {
        return Err(CohortError::invalid_operands("NOT requires a non-empty operand"));
    }
    Ok(universe.difference(set).cloned().collect())
}

/// Combine `operands` with `operator`. `Not` only uses the first operand.
pub fn apply(
    operator: SetOperator,
    operands: &[IdentifierSet],
    universe: &IdentifierSet,
) -> CohortResult<IdentifierSet> {
    match operator {
        SetOperator::And => Ok(intersect(operands)),
        SetOperator::Or => Ok(union(operands)),
        SetOperator::Not => {
            let first = operands
                .first()
                .ok_or_else(|| CohortError::invalid_operands("NOT requires an operand"))?;
            complement(universe, first)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::btree_set;
    use proptest::prelude::*;

    fn ids(values: &[&str]) -> IdentifierSet {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_and_or_examples() {
        let a = ids(&["1", "2", "5", "10"]);
        let b = ids(&["1", "2", "4", "5", "6", "10"]);
        let operands = [a, b];

        assert_eq!(
            apply(SetOperator::And, &operands, &IdentifierSet::new()).unwrap(),
            ids(&["1", "2", "5", "10"])
        );
        assert_eq!(
            apply(SetOperator::Or, &operands, &IdentifierSet::new()).unwrap(),
            ids(&["1", "2", "4", "5", "6", "10"])
        );
    }

    #[test]
    fn test_empty_operand_lists() {
        assert!(intersect(&[]).is_empty());
        assert!(union(&[]).is_empty());
        assert!(matches!(
            apply(SetOperator::Not, &[], &ids(&["1"])),
            Err(CohortError::InvalidOperands { .. })
        ));
    }

    #[test]
    fn test_not_uses_first_operand() {
        let universe = ids(&["1", "2", "3", "4"]);
        let result = apply(SetOperator::Not, &[ids(&["1"]), ids(&["2"])], &universe).unwrap();
        assert_eq!(result, ids(&["2", "3", "4"]));
    }

    #[test]
    fn test_complement_guards() {
        assert!(complement(&IdentifierSet::new(), &ids(&["1"])).is_err());
        assert!(complement(&ids(&["1"]), &IdentifierSet::new()).is_err());
        assert_eq!(complement(&ids(&["1", "2"]), &ids(&["2", "9"])).unwrap(), ids(&["1"]));
    }

    fn id_set() -> impl Strategy<Value = IdentifierSet> {
        btree_set("[a-e][0-9]", 0..8)
    }

    proptest! {
        #[test]
        fn prop_intersect_commutative(a in id_set(), b in id_set()) {
            prop_assert_eq!(intersect(&[a.clone(), b.clone()]), intersect(&[b, a]));
        }

        #[test]
        fn prop_intersect_associative(a in id_set(), b in id_set(), c in id_set()) {
            let left = intersect(&[intersect(&[a.clone(), b.clone()]), c.clone()]);
            let right = intersect(&[a, intersect(&[b, c])]);
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_union_commutative(a in id_set(), b in id_set()) {
            prop_assert_eq!(union(&[a.clone(), b.clone()]), union(&[b, a]));
        }

        #[test]
        fn prop_union_associative(a in id_set(), b in id_set(), c in id_set()) {
            let left = union(&[union(&[a.clone(), b.clone()]), c.clone()]);
            let right = union(&[a, union(&[b, c])]);
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_single_set_is_identity(a in id_set()) {
            prop_assert_eq!(intersect(std::slice::from_ref(&a)), a.clone());
            prop_assert_eq!(union(std::slice::from_ref(&a)), a);
        }

        #[test]
        fn prop_complement_partitions_universe(universe in id_set(), set in id_set()) {
            prop_assume!(!universe.is_empty() && !set.is_empty());
            let rest = complement(&universe, &set).unwrap();

            prop_assert!(rest.is_disjoint(&set));
            prop_assert!(rest.is_subset(&universe));
            let covered = union(&[rest, set]);
            prop_assert!(universe.is_subset(&covered));
        }
    }
}
