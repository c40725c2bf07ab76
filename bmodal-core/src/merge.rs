//! Recursive merging of partial option records.
//!
//! Every overlay option has a default. Callers (and the configuration file)
//! only supply the fields they care about, as partial JSON records, and the
//! effective configuration is obtained by merging those records onto the
//! defaults left to right.

use serde_json::{Map, Value};

/// Merge each override into `base`, left to right, and return `base`.
///
/// - Records are merged key by key, recursing into nested records (a missing
///   or non-record slot in `base` is replaced by an empty record first).
/// - Lists are rebuilt: the slot becomes a fresh list of the same length whose
///   elements are merged from the override's elements.
/// - Any other value overwrites the slot.
///
/// A `null` base becomes an empty record. `null` overrides are skipped. The
/// overrides are only read, never modified.
pub fn deep_extend<'b, 'o, I>(base: &'b mut Value, overrides: I) -> &'b mut Value
where
    I: IntoIterator<Item = &'o Value>,
{
    if base.is_null() {
        *base = Value::Object(Map::new());
    }
    for layer in overrides {
        extend_from(base, layer);
    }
    base
}

/// Copy `base` and merge the overrides into the copy.
#[must_use]
pub fn merged<'o, I>(base: &Value, overrides: I) -> Value
where
    I: IntoIterator<Item = &'o Value>,
{
    let mut copy = base.clone();
    deep_extend(&mut copy, overrides);
    copy
}

fn extend_from(target: &mut Value, layer: &Value) {
    match layer {
        Value::Object(entries) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(slots) = target {
                for (key, value) in entries {
                    extend_slot(slots.entry(key.clone()).or_insert(Value::Null), value);
                }
            }
        }
        Value::Array(items) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(slots) = target {
                if slots.len() < items.len() {
                    slots.resize(items.len(), Value::Null);
                }
                for (slot, value) in slots.iter_mut().zip(items) {
                    extend_slot(slot, value);
                }
            }
        }
        // Scalars carry no entries to merge.
        _ => {}
    }
}

fn extend_slot(slot: &mut Value, value: &Value) {
    match value {
        Value::Object(_) => extend_from(slot, value),
        Value::Array(items) => {
            *slot = Value::Array(vec![Value::Null; items.len()]);
            extend_from(slot, value);
        }
        _ => *slot = value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_overrides_replace_defaults() {
        let mut base = json!({ "size": "", "closeButton": true });
        deep_extend(&mut base, [&json!({ "closeButton": false })]);
        assert_eq!(base, json!({ "size": "", "closeButton": false }));
    }

    #[test]
    fn nested_records_merge_recursively() {
        let mut base = json!({ "stacking": { "base": 2050, "step": 20 } });
        deep_extend(&mut base, [&json!({ "stacking": { "step": 10 } })]);
        assert_eq!(base, json!({ "stacking": { "base": 2050, "step": 10 } }));
    }

    #[test]
    fn missing_nested_record_is_created() {
        let mut base = json!({});
        deep_extend(&mut base, [&json!({ "a": { "b": { "c": 1 } } })]);
        assert_eq!(base, json!({ "a": { "b": { "c": 1 } } }));
    }

    #[test]
    fn lists_are_replaced_element_wise() {
        let mut base = json!({ "actions": [{ "title": "a" }, { "title": "b" }, { "title": "c" }] });
        deep_extend(&mut base, [&json!({ "actions": [{ "color": "danger" }] })]);
        // The override's list wins outright, element for element.
        assert_eq!(base, json!({ "actions": [{ "color": "danger" }] }));
    }

    #[test]
    fn null_base_becomes_record() {
        let mut base = Value::Null;
        deep_extend(&mut base, [&json!({ "a": 1 })]);
        assert_eq!(base, json!({ "a": 1 }));

        let mut empty = Value::Null;
        deep_extend(&mut empty, []);
        assert_eq!(empty, json!({}));
    }

    #[test]
    fn null_overrides_are_skipped() {
        let mut base = json!({ "a": 1 });
        deep_extend(&mut base, [&Value::Null, &json!({ "b": 2 }), &Value::Null]);
        assert_eq!(base, json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn overrides_apply_left_to_right() {
        let mut base = json!({ "color": "dark" });
        deep_extend(
            &mut base,
            [&json!({ "color": "info" }), &json!({ "color": "danger" })],
        );
        assert_eq!(base["color"], "danger");
    }

    #[test]
    fn sequential_merge_equals_single_multi_merge() {
        let base = json!({ "a": { "x": 1, "y": [1, 2] }, "b": true });
        let first = json!({ "a": { "y": [{ "z": 3 }] }, "c": "new" });
        let second = json!({ "a": { "x": 5 }, "b": null });

        let stepwise = merged(&merged(&base, [&first]), [&second]);
        let at_once = merged(&base, [&first, &second]);
        assert_eq!(stepwise, at_once);
    }

    #[test]
    fn overrides_are_not_mutated() {
        let first = json!({ "nested": { "list": [{ "a": 1 }] } });
        let second = json!({ "nested": { "list": [{ "b": 2 }], "flag": true } });
        let (first_before, second_before) = (first.clone(), second.clone());

        let mut base = json!({ "nested": { "keep": 0 } });
        deep_extend(&mut base, [&first, &second]);

        assert_eq!(first, first_before);
        assert_eq!(second, second_before);
        assert_eq!(
            base,
            json!({ "nested": { "keep": 0, "list": [{ "b": 2 }], "flag": true } })
        );
    }

    #[test]
    fn record_override_replaces_scalar_slot() {
        let mut base = json!({ "title": "plain" });
        deep_extend(&mut base, [&json!({ "title": { "markup": "<b>x</b>" } })]);
        assert_eq!(base, json!({ "title": { "markup": "<b>x</b>" } }));
    }
}
