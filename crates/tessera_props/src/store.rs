use crate::dictionary::PropertyDictionary;
use crate::error::{PropsError, PropsResult};
use crate::merge::deep_merge;
use crate::path::{get_path, get_path_mut, path_to_object, split_path};
use crate::schema::{PropertySchema, SchemaLayer};
use serde_json::{Map, Value};

/// Owns a widget's live property tree and the dictionary describing it.
///
/// The dictionary is advisory: merges never consult it, so option payloads
/// carrying keys unknown to the schema are kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyStore {
    tree: Value,
    dictionary: PropertyDictionary,
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyStore {
    pub fn new() -> Self {
        Self {
            tree: Value::Object(Map::new()),
            dictionary: PropertyDictionary::new(),
        }
    }

    /// Seeds the store from schema layers ordered base-first.
    pub fn initialize(&mut self, layers: &[SchemaLayer]) {
        for layer in layers {
            self.apply_layer(layer);
        }
    }

    pub fn apply_layer(&mut self, layer: &SchemaLayer) {
        deep_merge(&mut self.tree, &layer.property, );
        self.dictionary.extend(layer.dictionary.iter().cloned());
    }

    pub fn merge(&mut self, partial: &Value) {
        deep_merge(&mut self.tree, partial, );
    }

    /// Merges `{a: {b: {c: value}}}` for the path `a.b.c`.
    pub fn set_by_path(&mut self, path: &str, value: Value) -> PropsResult<()> {
        let partial = path_to_object(path, value)?;
        self.merge(&partial);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        get_path(&self.tree, path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        get_path_mut(&mut self.tree, path)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(Value::as_f64)
    }

    pub fn get_f64_array(&self, path: &str) -> Option<Vec<f64>> {
        self.get(path)?
            .as_array()?
            .iter()
            .map(Value::as_f64)
            .collect()
    }

    /// Returns the object group at `path`, creating missing groups on the way.
    pub fn group_mut(&mut self, path: &str) -> PropsResult<&mut Map<String, Value>> {
        let segments = split_path(path)?;
        let mut current = &mut self.tree;
        for (depth, segment) in segments.iter().enumerate() {
            let map = current.as_object_mut().ok_or_else(|| PropsError::NotAGroup {
                path: path.to_string(),
                at: segments[..depth].join("."),
            })?;
            current = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        current.as_object_mut().ok_or_else(|| PropsError::NotAGroup {
            path: path.to_string(),
            at: path.to_string(),
        })
    }

    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let segments = split_path(path).ok()?;
        let (last, parents) = segments.split_last()?;
        let parent = if parents.is_empty() {
            &mut self.tree
        } else {
            get_path_mut(&mut self.tree, &parents.join("."))?
        };
        parent.as_object_mut()?.remove(*last)
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn dictionary(&self) -> &PropertyDictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut PropertyDictionary {
        &mut self.dictionary
    }

    pub fn dictionary_node_at(&self, path: &str) -> Option<&PropertySchema> {
        self.dictionary.find(path)
    }

    pub fn dictionary_node_at_mut(&mut self, path: &str) -> Option<&mut PropertySchema> {
        self.dictionary.find_mut(path)
    }

    pub fn set_editable(&mut self, path: &str, editable: bool) -> PropsResult<()> {
        let node = self
            .dictionary
            .find_mut(path)
            .ok_or_else(|| PropsError::MissingNode(path.to_string()))?;
        node.editable = editable;
        Ok(())
    }
}
