//! Ready-made argument validators.

use std::sync::Arc;

use wraptag_templates::Value;

use crate::argument::Validator;
use crate::error::ValidationError;
use crate::rendered::RenderedTag;

/// Accepts strings only.
#[must_use]
pub fn string() -> Validator {
    Arc::new(|value: &Value| match value {
        Value::Str(_) => Ok(()),
        other => Err(ValidationError::new(format!(
            "value of type {} is not a string",
            other.type_name()
        ))),
    })
}

/// Accepts output of the given tags, or of any tag when `tags` is empty.
/// Falsy values pass.
#[must_use]
pub fn requires_tag<S: AsRef<str>>(tags: &[S]) -> Validator {
    let tags: Vec<String> = tags.iter().map(|t| t.as_ref().to_string()).collect();
    Arc::new(move |value: &Value| {
        if !value.is_truthy() {
            return Ok(());
        }
        let Some(rendered) = value.downcast_ref::<RenderedTag>() else {
            return Err(ValidationError::new(format!("value {value} is not a tag")));
        };
        if tags.is_empty() || tags.iter().any(|t| t == rendered.tag()) {
            Ok(())
        } else {
            Err(ValidationError::new(format!(
                "tag {} not in allowed list: {:?}",
                rendered.tag(),
                tags
            )))
        }
    })
}

/// Passes when any of `validators` passes.
#[must_use]
pub fn any_of(validators: Vec<Validator>) -> Validator {
    Arc::new(move |value: &Value| {
        let mut errors = Vec::new();
        for validator in &validators {
            match validator(value) {
                Ok(()) => return Ok(()),
                Err(err) => errors.push(err.0),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(errors.join("; ")))
        }
    })
}

/// Accepts one of `values`.
#[must_use]
pub fn one_of<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Validator {
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    Arc::new(move |value: &Value| {
        if values.contains(value) {
            Ok(())
        } else {
            Err(ValidationError::new(format!("{value} is not an allowed value")))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string() {
        assert!(string()(&Value::from("x")).is_ok());
        assert!(string()(&Value::from(1)).is_err());
    }

    #[test]
    fn test_requires_tag() {
        let tooltip = Value::object(RenderedTag::new("tip", "tooltip"));
        let popover = Value::object(RenderedTag::new("pop", "popover"));

        let validator = requires_tag(&["tooltip"]);
        assert!(validator(&tooltip).is_ok());
        assert!(validator(&popover).is_err());
        assert!(validator(&Value::from("text")).is_err());
        assert!(validator(&Value::None).is_ok());

        let none: [&str; 0] = [];
        assert!(requires_tag(&none)(&popover).is_ok());
    }

    #[test]
    fn test_any_of() {
        let validator = any_of(vec![requires_tag(&["tooltip"]), string()]);
        assert!(validator(&Value::from("plain")).is_ok());
        assert!(validator(&Value::object(RenderedTag::new("t", "tooltip"))).is_ok());
        let err = validator(&Value::from(3)).unwrap_err();
        assert!(err.0.contains("not a string"));
        assert!(any_of(Vec::new())(&Value::from(3)).is_ok());
    }

    #[test]
    fn test_one_of() {
        let validator = one_of(["left", "right"]);
        assert!(validator(&Value::from("left")).is_ok());
        assert!(validator(&Value::from("up")).is_err());
    }
}
