use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use validator::{ValidationError, ValidationErrors};

/// Field name (camelCase, as the API spells it) to message.
pub type FieldErrors = HashMap<String, String>;

/// Flatten `validator` output into one message per field.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| errs.first().map(|e| (api_field_name(field), message(e))))
        .collect()
}

/// `store_id` -> `storeID`, `full_name` -> `fullName`; already camelCase names pass through.
pub fn api_field_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for (i, part) in field.split('_').filter(|p| !p.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(part);
        } else if part == "id" {
            out.push_str("ID");
        } else {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

fn message(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "length" => {
            let min = error.params.get("min").and_then(|v| v.as_u64());
            let max = error.params.get("max").and_then(|v| v.as_u64());
            match (min, max) {
                (Some(min), Some(max)) => format!("must be between {} and {} characters", min, max),
                (Some(min), None) => format!("must be at least {} characters", min),
                (None, Some(max)) => format!("must be at most {} characters", max),
                (None, None) => "has an invalid length".to_string(),
            }
        }
        "required" => "is required".to_string(),
        _ => "is invalid".to_string(),
    }
}

/// Single-entry map, for errors raised outside `validator`.
pub fn single(field: &str, message: impl Into<String>) -> FieldErrors {
    HashMap::from([(field.to_string(), message.into())])
}

/// Lets `Option<Option<T>>` tell "absent" (`None`) from explicit `null` (`Some(None)`).
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
