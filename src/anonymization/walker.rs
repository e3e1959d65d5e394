//! Payload traversal
//!
//! Rebuilds a `serde_json::Value` tree, passing every string leaf through a
//! transformation. Numbers, booleans and nulls are cloned unchanged, object
//! keys are never touched, and the input tree is only borrowed.

use crate::domain::Result;
use serde_json::{Map, Value};

/// Rebuild `value`, running each string leaf through a fallible transform
///
/// The first error aborts the walk and is returned as is.
pub fn walk_anonymize<F>(value: &Value, transform: &mut F) -> Result<Value>
where
    F: FnMut(&str) -> Result<String>,
{
    match value {
        Value::String(s) => Ok(Value::String(transform(s)?)),
        Value::Array(items) => items
            .iter()
            .map(|item| walk_anonymize(item, transform))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, field) in fields {
                out.insert(key.clone(), walk_anonymize(field, transform)?);
            }
            Ok(Value::Object(out))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
    }
}

/// Rebuild `value`, running each string leaf through an infallible transform
pub fn walk_deanonymize<F>(value: &Value, transform: &mut F) -> Value
where
    F: FnMut(&str) -> String,
{
    match value {
        Value::String(s) => Value::String(transform(s)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| walk_deanonymize(item, transform))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, field)| (key.clone(), walk_deanonymize(field, transform)))
                .collect(),
        ),
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CloakError;
    use serde_json::json;

    #[test]
    fn test_only_strings_are_transformed() {
        let payload = json!({
            "flag": true,
            "user": null,
            "messages": [{"content": 123}, {"content": "hi", "weight": 0.5}]
        });

        let result = walk_anonymize(&payload, &mut |s: &str| Ok(s.to_uppercase())).unwrap();
        assert_eq!(
            result,
            json!({
                "flag": true,
                "user": null,
                "messages": [{"content": 123}, {"content": "HI", "weight": 0.5}]
            })
        );
    }

    #[test]
    fn test_keys_and_order_are_preserved() {
        let payload = json!({"zeta": "a", "alpha": "b", "mid": ["c", "d"]});
        let result = walk_deanonymize(&payload, &mut |s: &str| format!("{s}!"));

        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(result["mid"], json!(["c!", "d!"]));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let payload = json!({"content": "secret"});
        let _ = walk_anonymize(&payload, &mut |_: &str| Ok("<RANDOM_SECRET_0>".to_string()));
        assert_eq!(payload["content"], "secret");
    }

    #[test]
    fn test_error_aborts_walk() {
        let payload = json!(["ok", "bad", "never"]);
        let mut seen = Vec::new();
        let err = walk_anonymize(&payload, &mut |s: &str| {
            seen.push(s.to_string());
            if s == "bad" {
                Err(CloakError::Detection("detector offline".to_string()))
            } else {
                Ok(s.to_string())
            }
        })
        .unwrap_err();

        assert!(matches!(err, CloakError::Detection(_)));
        assert_eq!(seen, vec!["ok", "bad"]);
    }

    #[test]
    fn test_scalars_pass_through() {
        for scalar in [json!(null), json!(false), json!(42), json!(-1.25)] {
            assert_eq!(walk_deanonymize(&scalar, &mut |s: &str| s.to_string()), scalar);
        }
    }
}
