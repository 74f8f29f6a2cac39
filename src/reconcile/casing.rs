//! Key case conversion.
//!
//! Only ASCII letters and underscores change. Anything else, such as graph
//! node names, is left alone.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Snake,
    Camel,
}

impl Case {
    pub fn apply(self, key: &str) -> String {
        match self {
            Case::Snake => camel_to_snake(key),
            Case::Camel => snake_to_camel(key),
        }
    }
}

pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (idx, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if idx > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    let mut leading = true;
    while let Some(c) = chars.next() {
        if c == '_' && !leading {
            match chars.peek() {
                Some(next) if next.is_ascii_lowercase() => {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
        leading = leading && c == '_';
    }
    out
}

/// Converts object keys recursively.
///
/// Fields listed in `data_keyed` (matched before conversion) hold objects
/// whose keys are data. Those keys are kept and only deeper levels convert.
pub fn convert_keys(value: Value, case: Case, data_keyed: &[&str]) -> Value {
    convert(value, case, data_keyed, false)
}

fn convert(value: Value, case: Case, data_keyed: &[&str], keep_keys: bool) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                let inner_keeps = data_keyed.contains(&key.as_str());
                let key = if keep_keys { key } else { case.apply(&key) };
                out.insert(key, convert(inner, case, data_keyed, inner_keeps));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| convert(item, case, data_keyed, false))
                .collect(),
        ),
        other => other,
    }
}
