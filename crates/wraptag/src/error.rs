use thiserror::Error;
use wraptag_templates::TemplateError;

/// Failures that abort compiling or rendering a tag occurrence.
#[derive(Error, Debug)]
pub enum TagError {
    #[error("{0}")]
    Syntax(String),
    #[error("{0}")]
    Configuration(String),
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    #[error("{0}")]
    Render(String),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl From<TagError> for TemplateError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::Syntax(msg) => TemplateError::Syntax(msg),
            TagError::Configuration(msg) => TemplateError::Configuration(msg),
            TagError::TemplateNotFound(msg) => TemplateError::TemplateNotFound(msg),
            TagError::Render(msg) => TemplateError::Render(msg),
            TagError::Template(err) => err,
        }
    }
}

/// A value rejected by a validator or a choice set. Never surfaces to the
/// template author: the argument falls back to its default.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Outcome of a clean or render hook that did not produce a value.
#[derive(Error, Debug)]
pub enum HookError {
    /// The value is invalid, use the default instead.
    #[error("invalid value: {0}")]
    Invalid(String),
    /// No custom behavior, keep the value as is.
    #[error("hook not implemented")]
    NotImplemented,
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl From<ValidationError> for HookError {
    fn from(err: ValidationError) -> Self {
        HookError::Invalid(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_error_maps_to_template_error() {
        let cases = [
            (
                TagError::Syntax("bad".to_string()),
                TemplateError::Syntax("bad".to_string()),
            ),
            (
                TagError::Configuration("conf".to_string()),
                TemplateError::Configuration("conf".to_string()),
            ),
            (
                TagError::TemplateNotFound("card.html".to_string()),
                TemplateError::TemplateNotFound("card.html".to_string()),
            ),
            (
                TagError::Template(TemplateError::Render("inner".to_string())),
                TemplateError::Render("inner".to_string()),
            ),
        ];
        for (tag_error, expected) in cases {
            assert_eq!(TemplateError::from(tag_error), expected);
        }
    }

    #[test]
    fn test_validation_error_is_invalid_hook() {
        let err = HookError::from(ValidationError::new("odd"));
        assert!(matches!(err, HookError::Invalid(msg) if msg == "odd"));
    }
}
