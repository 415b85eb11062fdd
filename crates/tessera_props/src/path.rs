use crate::error::{PropsError, PropsResult};
use serde_json::{Map, Value};

/// Splits a dotted property path into its segments.
pub fn split_path(path: &str) -> PropsResult<Vec<&str>> {
    if path.is_empty() {
        return Err(PropsError::EmptyPath);
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(PropsError::EmptySegment { path: path.to_string() });
    }
    Ok(segments)
}

/// Turns `"a.b.c"` and a value into `{"a": {"b": {"c": value}}}`.
pub fn path_to_object(path: &str, value: Value) -> PropsResult<Value> {
    let segments = split_path(path)?;
    let mut object = value;
    for segment in segments.into_iter().rev() {
        let mut map = Map::new();
        map.insert(segment.to_string(), object);
        object = Value::Object(map);
    }
    Ok(object)
}

/// Reads the value at a dotted path. Numeric segments index into arrays.
pub fn get_path<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = tree;
    for segment in split_path(path).ok()? {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

pub fn get_path_mut<'a>(tree: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = tree;
    for segment in split_path(path).ok()? {
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
