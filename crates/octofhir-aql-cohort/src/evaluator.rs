//! Cohort tree evaluation

use crate::set_algebra::{self, IdentifierSet, SetOperator};
use crate::{CohortError, CohortNode, CohortResult, LeafQueryExecutor};
use log::{debug, warn};
use octofhir_aql_policy::Parameters;
use once_cell::unsync::OnceCell;

/// Walks a cohort tree depth-first, combining leaf results with set algebra
pub struct CohortEvaluator<'a> {
    executor: &'a LeafQueryExecutor,
}

/// State of one top-level evaluation
struct Evaluation {
    allow_outside_eu: bool,
    universe: OnceCell<IdentifierSet>,
}

impl<'a> CohortEvaluator<'a> {
    pub fn new(executor: &'a LeafQueryExecutor) -> Self {
        Self { executor }
    }

    /// Evaluate a cohort tree.
    ///
    /// Every child is evaluated, in order, before its group is combined. A
    /// failing leaf aborts the evaluation.
    pub fn evaluate(&self, root: Option<&CohortNode>, allow_outside_eu: bool) -> CohortResult<IdentifierSet> {
        let root = root.ok_or(CohortError::EmptyCohort)?;
        let evaluation = Evaluation {
            allow_outside_eu,
            universe: OnceCell::new(),
        };
        self.evaluate_node(root, &Parameters::new(), &evaluation)
    }

    fn evaluate_node(
        &self,
        node: &CohortNode,
        inherited: &Parameters,
        evaluation: &Evaluation,
    ) -> CohortResult<IdentifierSet> {
        let mut parameters = inherited.clone();
        parameters.extend(node.parameters().iter().map(|(k, v)| (k.clone(), v.clone())));

        match node {
            CohortNode::Leaf { query, .. } => {
                self.executor
                    .execute(query.as_ref(), &parameters, Some(evaluation.allow_outside_eu))
            }
            CohortNode::Group {
                operator, children, ..
            } => {
                if children.is_empty() {
                    return Err(CohortError::invalid_operands(format!("{operator} group has no children")));
                }
                if *operator == SetOperator::Not && children.len() > 1 {
                    warn!(
                        "NOT group has {} children, only the first one is used",
                        children.len()
                    );
                }

                let operands = children
                    .iter()
                    .map(|child| self.evaluate_node(child, &parameters, evaluation))
                    .collect::<CohortResult<Vec<_>>>()?;

                let result = match operator {
                    SetOperator::Not => {
                        let universe = evaluation
                            .universe
                            .get_or_try_init(|| self.executor.universe())?;
                        set_algebra::apply(*operator, &operands, universe)?
                    }
                    _ => set_algebra::apply(*operator, &operands, &IdentifierSet::new())?,
                };
                debug!("{} group of {} matched {} subject(s)", operator, operands.len(), result.len());
                Ok(result)
            }
        }
    }
}
