use serde_json::Value;

/// Merges `patch` into `target`. Objects merge key by key and absent keys are
/// left alone; keys missing from `target` are created. Every other value,
/// arrays included, replaces what was there.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(key) {
                    Some(slot) if slot.is_object() && value.is_object() => {
                        deep_merge(slot, value);
                    }
                    Some(slot) => *slot = value.clone(),
                    None => {
                        existing.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Appends the members of `extra` that are not already present, dropping
/// duplicates the way a set union would. Used for list fields that
/// accumulate across option layers instead of being replaced.
pub fn union_values(target: &mut Vec<Value>, extra: &[Value]) {
    let mut merged: Vec<Value> = Vec::with_capacity(target.len() + extra.len());
    for value in target.drain(..).chain(extra.iter().cloned()) {
        if !merged.contains(&value) {
            merged.push(value);
        }
    }
    *target = merged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_keys_are_untouched() {
        let mut tree = json!({"basic": {"code": "c1", "zIndex": 1}, "other": true});
        deep_merge(&mut tree, &json!({"basic": {"zIndex": 4}}));
        assert_eq!(tree, json!({"basic": {"code": "c1", "zIndex": 4}, "other": true}));
    }

    #[test]
    fn arrays_are_replaced_wholesale() {
        let mut tree = json!({"basic": {"frame": [0, 0, 1920, 1080]}});
        deep_merge(&mut tree, &json!({"basic": {"frame": [5, 5]}}));
        assert_eq!(tree["basic"]["frame"], json!([5, 5]));
    }

    #[test]
    fn union_keeps_first_occurrences_in_order() {
        let mut scripts = vec![json!({"trigger": "click"}), json!({"trigger": "click"})];
        union_values(&mut scripts, &[json!({"trigger": "load"}), json!({"trigger": "click"})]);
        assert_eq!(scripts, vec![json!({"trigger": "click"}), json!({"trigger": "load"})]);
    }

    #[test]
    fn unknown_keys_are_created() {
        let mut tree = json!({});
        deep_merge(&mut tree, &json!({"future": {"flag": 1}}));
        assert_eq!(tree, json!({"future": {"flag": 1}}));
    }
}
