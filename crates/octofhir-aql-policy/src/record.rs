//! Record containers the restriction policies anchor on

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute holding the subject (EHR) identifier
pub const EHR_ID_PATH: &str = "ehr_id/value";

/// Attribute holding the template a composition was recorded with
pub const TEMPLATE_ID_PATH: &str = "archetype_details/template_id/value";

/// Attribute holding the consent identifier recorded in the feeder audit
pub const CONSENT_ID_PATH: &str = "feeder_audit/feeder_system_audit/other_details[openEHR-EHR-ITEM_TREE.generic.v1]/items[at0001]/value/id";

/// Reference model class a restriction is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordContainer {
    /// The patient record (`EHR`)
    Ehr,
    /// A clinical document inside the record (`COMPOSITION`)
    Composition,
}

impl RecordContainer {
    /// Class name as written in a containment clause
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::Ehr => "EHR",
            Self::Composition => "COMPOSITION",
        }
    }

    /// Prefix for generated aliases (`e3`, `c4`)
    pub const fn alias_prefix(&self) -> &'static str {
        match self {
            Self::Ehr => "e",
            Self::Composition => "c",
        }
    }
}

impl fmt::Display for RecordContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}
