//! BSON key sanitization for MongoDB compatibility.
//!
//! MongoDB restricts document keys from containing dots, dollar signs, and
//! null bytes, which carry meaning in its query syntax. Write payloads are
//! caller-supplied documents, so their keys and strings are escaped on the
//! way in and restored on the way out.

use bson::Bson;

/// Character replacements applied during sanitization.
const REPLACEMENTS: [(&str, &str); 3] = [
    (".", "__dot__"),
    ("$", "__dollar__"),
    ("\0", "__null__"),
];

/// Recursively sanitizes a BSON value, escaping problematic characters in
/// keys and strings. Non-container, non-string values pass through.
pub(crate) fn sanitize_value(value: &Bson) -> Bson {
    match value {
        Bson::String(text) => Bson::String(sanitize_string(text)),
        Bson::Array(items) => Bson::Array(items.iter().map(sanitize_value).collect()),
        Bson::Document(body) => Bson::Document(
            body.iter()
                .map(|(key, value)| (sanitize_string(key), sanitize_value(value)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Escapes problematic characters in a single string.
pub(crate) fn sanitize_string(input: &str) -> String {
    REPLACEMENTS
        .iter()
        .fold(input.to_string(), |text, (target, replacement)| {
            text.replace(target, replacement)
        })
}

/// Recursively restores a BSON value, reverting [`sanitize_value`].
pub(crate) fn restore_value(value: &Bson) -> Bson {
    match value {
        Bson::String(text) => Bson::String(restore_string(text)),
        Bson::Array(items) => Bson::Array(items.iter().map(restore_value).collect()),
        Bson::Document(body) => Bson::Document(
            body.iter()
                .map(|(key, value)| (restore_string(key), restore_value(value)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Reverts [`sanitize_string`] escapes.
pub(crate) fn restore_string(input: &str) -> String {
    REPLACEMENTS
        .iter()
        .rev()
        .fold(input.to_string(), |text, (target, replacement)| {
            text.replace(replacement, target)
        })
}
