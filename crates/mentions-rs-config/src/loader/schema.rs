//! Shape checks run on the raw JSON5 document before it is decoded.
//!
//! serde would reject most of these too, but its messages lose the field
//! path and it silently ignores unknown keys.

use super::invalid;
use crate::ConfigError;
use serde_json::Value;

/// What a leaf field is allowed to hold.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    NullableText,
    Count,
    Number,
}

impl FieldKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::NullableText => value.is_string() || value.is_null(),
            FieldKind::Count => value.is_u64(),
            FieldKind::Number => value.is_number(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FieldKind::Text => "expected string",
            FieldKind::NullableText => "expected string or null",
            FieldKind::Count => "expected non-negative integer",
            FieldKind::Number => "expected number",
        }
    }
}

type Section = (&'static str, &'static [(&'static str, FieldKind)]);

const SECTIONS: &[Section] = &[
    (
        "store",
        &[
            ("path", FieldKind::NullableText),
            ("busy_timeout_ms", FieldKind::Count),
        ],
    ),
    (
        "similarity",
        &[
            ("max_dimension", FieldKind::Count),
            ("eigen_epsilon", FieldKind::Number),
            ("max_iterations", FieldKind::Count),
        ],
    ),
    ("ratios", &[("default_result_size", FieldKind::Count)]),
];

/// Check every key of `document` against the known sections and fields.
pub(super) fn validate_schema(document: &Value) -> Result<(), ConfigError> {
    let Value::Object(root) = document else {
        return Err(invalid("root", "expected object"));
    };
    for (name, value) in root {
        if name == "$schema" {
            check_field(value, FieldKind::Text, name)?;
            continue;
        }
        let Some((_, fields)) = SECTIONS.iter().find(|(section, _)| section == name) else {
            return Err(invalid(name, "unknown key"));
        };
        let Value::Object(section) = value else {
            return Err(invalid(name, "expected object"));
        };
        for (field, value) in section {
            let path = format!("{name}.{field}");
            match fields.iter().find(|(known, _)| known == field) {
                Some((_, kind)) => check_field(value, *kind, &path)?,
                None => return Err(invalid(&path, "unknown key")),
            }
        }
    }
    Ok(())
}

fn check_field(value: &Value, kind: FieldKind, path: &str) -> Result<(), ConfigError> {
    if kind.accepts(value) {
        Ok(())
    } else {
        Err(invalid(path, kind.describe()))
    }
}
