use crate::path::split_path;
use crate::schema::PropertySchema;
use serde::{Deserialize, Serialize};

/// The editor-facing tree that parallels the live property tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyDictionary {
    roots: Vec<PropertySchema>,
}

impl PropertyDictionary {
    pub fn new() -> Self {
        Self { roots: Vec::new() }
    }

    pub fn roots(&self) -> &[PropertySchema] {
        &self.roots
    }

    /// Adds top-level nodes. A group that already exists is extended rather
    /// than duplicated.
    pub fn extend(&mut self, nodes: impl IntoIterator<Item = PropertySchema>) {
        for node in nodes {
            match self.roots.iter_mut().find(|r| r.name == node.name) {
                Some(existing) => existing.extend_with(node),
                None => self.roots.push(node),
            }
        }
    }

    /// Looks a node up by its dotted name path, e.g. `panel.panel_2.panelName`.
    pub fn find(&self, path: &str) -> Option<&PropertySchema> {
        let segments = split_path(path).ok()?;
        let (first, rest) = segments.split_first()?;
        let mut node = self.roots.iter().find(|r| r.name == *first)?;
        for segment in rest {
            node = node.child(segment)?;
        }
        Some(node)
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut PropertySchema> {
        let segments = split_path(path).ok()?;
        let (first, rest) = segments.split_first()?;
        let mut node = self.roots.iter_mut().find(|r| r.name == *first)?;
        for segment in rest {
            node = node.child_mut(segment)?;
        }
        Some(node)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValueKind;

    fn sample() -> PropertyDictionary {
        let mut dict = PropertyDictionary::new();
        dict.extend([PropertySchema::group(
            "panel",
            "Panels",
            vec![PropertySchema::group(
                "panel_2",
                "panel_2",
                vec![PropertySchema::field("panelName", "Name", ValueKind::String)],
            )],
        )]);
        dict
    }

    #[test]
    fn finds_nested_dynamic_nodes() {
        let dict = sample();
        let node = dict.find("panel.panel_2.panelName").expect("node");
        assert_eq!(node.kind, Some(ValueKind::String));
        assert!(dict.find("panel.panel_3").is_none());
        assert!(dict.find("panel..panelName").is_none());
    }

    #[test]
    fn extending_an_existing_group_does_not_duplicate_it() {
        let mut dict = sample();
        dict.extend([PropertySchema::group("panel", "", vec![])]);
        assert_eq!(dict.roots().len(), 1);
        assert!(dict.contains("panel.panel_2"));
    }
}
