//! Equipment hierarchy normalization.
//!
//! Collaborators report the AHU to VAV mapping either as a map
//! (`{"AHU1": ["VAV1", ...]}`) or as a sequence of pairs. Both shapes are
//! normalized at the boundary into one ordered sequence of [`AhuGroup`]s so
//! the orchestrator only ever walks a single canonical form. A group whose
//! AHU id is `None` (or empty in the source data) is the explicit
//! "unmapped VAVs" bucket.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{Error, Result};

/// One AHU and its subordinate VAVs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AhuGroup {
    /// AHU equipment id, `None` for VAVs with no known parent.
    pub ahu_id: Option<String>,
    /// VAV equipment ids under this AHU.
    pub vav_ids: Vec<String>,
}

/// Canonical, ordered equipment hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    groups: Vec<AhuGroup>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one AHU group. An empty AHU id is normalized to `None`.
    pub fn push(&mut self, ahu_id: Option<String>, vav_ids: Vec<String>) {
        let ahu_id = ahu_id.filter(|id| !id.is_empty());
        self.groups.push(AhuGroup { ahu_id, vav_ids });
    }

    pub fn groups(&self) -> &[AhuGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Normalize a JSON value in either collaborator shape.
    ///
    /// Accepts an object mapping AHU id to a VAV id array (a `null` or `""`
    /// key marks the unmapped bucket) or an array of `[ahu_id, [vav_ids]]`
    /// pairs.
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut hierarchy = Self::new();
        match value {
            Value::Object(map) => {
                for (ahu_id, vavs) in map {
                    hierarchy.push(Some(ahu_id.clone()), vav_ids_from(vavs)?);
                }
            }
            Value::Array(pairs) => {
                for pair in pairs {
                    let items = pair.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
                        Error::Settings(format!("expected [ahu_id, [vav_ids]] pair, got {pair}"))
                    })?;
                    let ahu_id = match &items[0] {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        other => {
                            return Err(Error::Settings(format!("invalid AHU id: {other}")));
                        }
                    };
                    hierarchy.push(ahu_id, vav_ids_from(&items[1])?);
                }
            }
            other => {
                return Err(Error::Settings(format!(
                    "equipment hierarchy must be an object or an array of pairs, got {other}"
                )));
            }
        }
        Ok(hierarchy)
    }
}

fn vav_ids_from(value: &Value) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::Settings(format!("expected an array of VAV ids, got {value}")))?;
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::Settings(format!("invalid VAV id: {v}")))
        })
        .collect()
}

impl From<BTreeMap<String, Vec<String>>> for Hierarchy {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        let mut hierarchy = Self::new();
        for (ahu_id, vav_ids) in map {
            hierarchy.push(Some(ahu_id), vav_ids);
        }
        hierarchy
    }
}

impl From<Vec<(Option<String>, Vec<String>)>> for Hierarchy {
    fn from(pairs: Vec<(Option<String>, Vec<String>)>) -> Self {
        let mut hierarchy = Self::new();
        for (ahu_id, vav_ids) in pairs {
            hierarchy.push(ahu_id, vav_ids);
        }
        hierarchy
    }
}

impl<'a> IntoIterator for &'a Hierarchy {
    type Item = &'a AhuGroup;
    type IntoIter = std::slice::Iter<'a, AhuGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_map_sorts_keys() {
        let mut map = BTreeMap::new();
        map.insert("AHU2".to_string(), ids(&["VAV3"]));
        map.insert("AHU1".to_string(), ids(&["VAV1", "VAV2"]));
        let hierarchy = Hierarchy::from(map);
        assert_eq!(hierarchy.groups()[0].ahu_id.as_deref(), Some("AHU1"));
        assert_eq!(hierarchy.groups()[1].ahu_id.as_deref(), Some("AHU2"));
    }

    #[test]
    fn test_from_pairs_keeps_order() {
        let hierarchy = Hierarchy::from(vec![
            (Some("AHU2".to_string()), ids(&["VAV3"])),
            (None, ids(&["VAV9"])),
        ]);
        assert_eq!(hierarchy.len(), 2);
        assert_eq!(hierarchy.groups()[0].ahu_id.as_deref(), Some("AHU2"));
        assert_eq!(hierarchy.groups()[1].ahu_id, None);
    }

    #[test]
    fn test_empty_ahu_id_normalized_to_none() {
        let mut hierarchy = Hierarchy::new();
        hierarchy.push(Some(String::new()), ids(&["VAV1"]));
        assert_eq!(hierarchy.groups()[0].ahu_id, None);
    }

    #[test]
    fn test_from_value_object_shape() {
        let hierarchy =
            Hierarchy::from_value(&json!({"AHU1": ["VAV1", "VAV2"], "": ["VAV9"]})).unwrap();
        assert_eq!(hierarchy.len(), 2);
        // serde_json objects iterate in key order; "" sorts first
        assert_eq!(hierarchy.groups()[0].ahu_id, None);
        assert_eq!(hierarchy.groups()[0].vav_ids, ids(&["VAV9"]));
        assert_eq!(hierarchy.groups()[1].vav_ids, ids(&["VAV1", "VAV2"]));
    }

    #[test]
    fn test_from_value_pair_shape() {
        let hierarchy =
            Hierarchy::from_value(&json!([["AHU1", ["VAV1"]], [null, ["VAV9"]]])).unwrap();
        assert_eq!(hierarchy.groups()[0].ahu_id.as_deref(), Some("AHU1"));
        assert_eq!(hierarchy.groups()[1].ahu_id, None);
    }

    #[test]
    fn test_from_value_rejects_scalars() {
        assert!(Hierarchy::from_value(&json!("AHU1")).is_err());
        assert!(Hierarchy::from_value(&json!([["AHU1", "VAV1"]])).is_err());
    }
}
