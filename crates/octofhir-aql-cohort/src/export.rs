//! Restrictions for exporting the records of a resolved cohort

use crate::{CohortError, CohortResult, IdentifierSet};
use log::{info, warn};
use octofhir_aql_policy::QueryPolicy;
use std::collections::BTreeSet;

/// Default minimum number of matching subjects before records are disclosed
pub const DEFAULT_PRIVACY_MIN_HITS: usize = 2;

/// Builds the policy chain applied to export queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPolicyComposer {
    privacy_min_hits: usize,
    consent_oid: Option<String>,
}

impl Default for ExportPolicyComposer {
    fn default() -> Self {
        Self::new(DEFAULT_PRIVACY_MIN_HITS, None)
    }
}

impl ExportPolicyComposer {
    pub fn new(privacy_min_hits: usize, consent_oid: Option<String>) -> Self {
        Self {
            privacy_min_hits,
            consent_oid,
        }
    }

    pub fn privacy_min_hits(&self) -> usize {
        self.privacy_min_hits
    }

    /// Refuse disclosure when fewer than `privacy_min_hits` subjects matched
    pub fn check_threshold(&self, hits: usize) -> CohortResult<()> {
        if hits < self.privacy_min_hits {
            warn!(
                "Refusing export: {} subject(s) matched, {} required",
                hits, self.privacy_min_hits
            );
            return Err(CohortError::PrivacyThresholdNotMet {
                hits,
                required: self.privacy_min_hits,
            });
        }
        Ok(())
    }

    /// Policies for exporting the records of `resolved_ids`.
    ///
    /// The EHR and template restrictions are always present; the consent
    /// restriction is added unless records may leave the EU.
    pub fn collect_policies(
        &self,
        resolved_ids: &IdentifierSet,
        template_ids: &BTreeSet<String>,
        allow_outside_eu: bool,
    ) -> CohortResult<Vec<QueryPolicy>> {
        self.check_threshold(resolved_ids.len())?;

        let mut policies = vec![
            QueryPolicy::EhrRestriction {
                ehr_ids: resolved_ids.clone(),
            },
            QueryPolicy::TemplateRestriction {
                template_ids: template_ids.clone(),
            },
        ];
        if !allow_outside_eu {
            policies.push(QueryPolicy::consent(self.consent_oid.clone()));
        }

        info!(
            "Export of {} subject(s) restricted by {} policies",
            resolved_ids.len(),
            policies.len()
        );
        Ok(policies)
    }
}
