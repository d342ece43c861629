//! Key casing conversion between database rows and API payloads

use serde::Serialize;
use serde_json::{Map, Value};

/// `user_id` -> `userId`
///
/// Only an underscore between an alphanumeric character and a lowercase
/// letter is a word break; any other underscore is kept as is.
pub fn to_camel_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;

    for (i, &c) in chars.iter().enumerate() {
        let is_break = c == '_'
            && i.checked_sub(1).is_some_and(|p| chars[p].is_alphanumeric())
            && chars.get(i + 1).is_some_and(|n| n.is_lowercase());

        if is_break {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `userId` -> `user_id`
pub fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn map_keys(value: Value, convert: fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (convert(&k), map_keys(v, convert)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| map_keys(v, convert)).collect())
        }
        other => other,
    }
}

/// Deep-convert object keys to camelCase
pub fn keys_to_camel_case(value: Value) -> Value {
    map_keys(value, to_camel_case)
}

/// Deep-convert object keys to snake_case
pub fn keys_to_snake_case(value: Value) -> Value {
    map_keys(value, to_snake_case)
}

/// Serialize `value` (timestamps become ISO-8601 strings) and convert its keys to snake_case
///
/// # Errors
/// Serialization failures
pub fn to_snake_case_value<T: Serialize>(value: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value).map(keys_to_snake_case)
}
