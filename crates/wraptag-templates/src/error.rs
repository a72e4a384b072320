use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum TemplateError {
    /// Syntax Error
    ///
    /// Raised while compiling a template. Common causes include:
    /// - Unknown block tags
    /// - Block tags missing their closing tag
    /// - Malformed tag arguments (keyword supplied twice, positional after keyword)
    /// - Unknown filters
    #[error("{0}")]
    Syntax(String),

    /// Configuration Error
    ///
    /// A developer-time problem with how a tag or engine is set up, such as a tag
    /// without a template or a variable-only tag used without `as`.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Template Not Found
    ///
    /// No loader could provide the requested template name.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Variable Does Not Exist
    ///
    /// A variable lookup failed. Variable nodes swallow this and emit
    /// `string_if_invalid`; tag arguments pass the raw token through.
    #[error("Variable does not exist: {0}")]
    VariableDoesNotExist(String),

    /// Render Error
    ///
    /// Raised by filters or tag hooks while rendering.
    #[error("Render error: {0}")]
    Render(String),

    /// IO Error
    ///
    /// File system issues while loading templates from disk.
    #[error("IO error: {0}")]
    Io(String),
}

impl TemplateError {
    /// Get a diagnostic code string for this error type
    #[must_use]
    pub fn diagnostic_code(&self) -> &'static str {
        match self {
            TemplateError::Syntax(_) => "T100",
            TemplateError::VariableDoesNotExist(_) => "T200",
            TemplateError::Render(_) => "T300",
            TemplateError::TemplateNotFound(_) => "T404",
            TemplateError::Io(_) => "T900",
            TemplateError::Configuration(_) => "T901",
        }
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_codes() {
        assert_eq!(TemplateError::Syntax(String::new()).diagnostic_code(), "T100");
        assert_eq!(
            TemplateError::Configuration(String::new()).diagnostic_code(),
            "T901"
        );
    }

    #[test]
    fn test_io_conversion() {
        let err: TemplateError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err, TemplateError::Io("missing".to_string()));
    }
}
