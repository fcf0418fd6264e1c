//! Structural diff of YAML values at a keypath

use serde_yaml::{Mapping, Value};

pub const PRIOR_REVISION_KEY: &str = "prior_revision";
pub const CURRENT_REVISION_KEY: &str = "current_revision";

/// Walk `keypath` into `document`. Mapping levels are indexed by key, sequence
/// levels by integer position (negative positions count from the end).
pub fn dig<'a>(document: &'a Value, keypath: &[Value]) -> Option<&'a Value> {
    keypath.iter().try_fold(document, |value, key| match value {
        Value::Mapping(mapping) => mapping.get(key),
        Value::Sequence(sequence) => {
            let position = key.as_i64()?;
            let index = if position < 0 {
                sequence.len().checked_sub(position.unsigned_abs() as usize)?
            } else {
                position as usize
            };
            sequence.get(index)
        }
        Value::Tagged(tagged) => dig(&tagged.value, std::slice::from_ref(key)),
        _ => None,
    })
}

/// Describe how `current` differs from `prior`. `None` stands for "absent" and
/// two absent values are equal.
pub fn diff(prior: Option<&Value>, current: Option<&Value>) -> Option<Value> {
    if prior == current {
        return None;
    }
    match (prior, current) {
        (Some(Value::Mapping(prior)), Some(Value::Mapping(current))) => diff_mappings(prior, current),
        (Some(Value::Sequence(prior)), Some(Value::Sequence(current))) => {
            diff_sequences(prior, current)
        }
        _ => {
            let mut branches = Mapping::new();
            branches.insert(
                Value::from(PRIOR_REVISION_KEY),
                prior.cloned().unwrap_or(Value::Null),
            );
            branches.insert(
                Value::from(CURRENT_REVISION_KEY),
                current.cloned().unwrap_or(Value::Null),
            );
            Some(Value::Mapping(branches))
        }
    }
}

fn diff_mappings(prior: &Mapping, current: &Mapping) -> Option<Value> {
    let keys = prior
        .keys()
        .chain(current.keys().filter(|key| !prior.contains_key(*key)));

    let mut changed = Mapping::new();
    for key in keys {
        if let Some(difference) = diff(prior.get(key), current.get(key)) {
            changed.insert(key.clone(), difference);
        }
    }
    (!changed.is_empty()).then_some(Value::Mapping(changed))
}

// Sequences compare as multisets; reordering alone is not a change.
fn diff_sequences(prior: &[Value], current: &[Value]) -> Option<Value> {
    let only_prior = multiset_difference(prior, current);
    let only_current = multiset_difference(current, prior);

    let mut changed = Mapping::new();
    if !only_prior.is_empty() {
        changed.insert(Value::from(PRIOR_REVISION_KEY), Value::Sequence(only_prior));
    }
    if !only_current.is_empty() {
        changed.insert(Value::from(CURRENT_REVISION_KEY), Value::Sequence(only_current));
    }
    (!changed.is_empty()).then_some(Value::Mapping(changed))
}

fn multiset_difference(values: &[Value], removing: &[Value]) -> Vec<Value> {
    let mut remaining: Vec<&Value> = removing.iter().collect();
    values
        .iter()
        .filter(|value| match remaining.iter().position(|r| r == value) {
            Some(position) => {
                remaining.swap_remove(position);
                false
            }
            None => true,
        })
        .cloned()
        .collect()
}

/// `<path> changed at keypath [..]` followed by the diff as a YAML document.
pub fn render(path: &str, keypath: &[Value], difference: &Value) -> String {
    let keys: Vec<String> = keypath.iter().map(inspect_key).collect();
    let body = serde_yaml::to_string(difference).unwrap_or_else(|_| format!("{difference:?}\n"));
    format!("{} changed at keypath [{}]\n---\n{}", path, keys.join(", "), body)
}

fn inspect_key(key: &Value) -> String {
    match key {
        Value::String(key) => format!("{key:?}"),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}
