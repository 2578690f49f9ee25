//! Identified paths (`alias[predicate]/object/path`)

use serde::{Deserialize, Serialize};

/// A path rooted at a containment alias, e.g. `c/archetype_details/template_id/value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedPath {
    /// Containment alias the path starts from
    pub root: String,
    /// Raw predicate attached to the root (`o[at0001]`), without brackets
    pub predicate: Option<String>,
    /// Object path below the root, without the leading `/`
    pub path: Option<String>,
}

impl IdentifiedPath {
    /// A bare alias reference
    pub fn alias(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            predicate: None,
            path: None,
        }
    }

    /// An alias with an object path below it
    pub fn new(root: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = path.trim_start_matches('/').to_string();
        Self {
            root: root.into(),
            predicate: None,
            path: (!path.is_empty()).then_some(path),
        }
    }

    /// Render the path in AQL syntax
    pub fn to_aql(&self) -> String {
        let mut out = self.root.clone();
        if let Some(predicate) = &self.predicate {
            out.push('[');
            out.push_str(predicate);
            out.push(']');
        }
        if let Some(path) = &self.path {
            out.push('/');
            out.push_str(path);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rendering() {
        assert_eq!(IdentifiedPath::new("e", "/ehr_id/value").to_aql(), "e/ehr_id/value");
        assert_eq!(IdentifiedPath::alias("c").to_aql(), "c");

        let mut path = IdentifiedPath::new("o", "data[at0001]/events[at0006]");
        path.predicate = Some("openEHR-EHR-OBSERVATION.blood_pressure.v2".to_string());
        assert_eq!(
            path.to_aql(),
            "o[openEHR-EHR-OBSERVATION.blood_pressure.v2]/data[at0001]/events[at0006]"
        );
    }
}
