use std::sync::Arc;

use wraptag_templates::CompileFn;
use wraptag_templates::Library;
use wraptag_templates::Parser;
use wraptag_templates::TemplateError;
use wraptag_templates::Token;

use crate::environment::Environment;
use crate::error::TagError;
use crate::schema::TagSchema;

fn is_valid_tag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(':')
        && !name.ends_with(':')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == ':' || c == '-')
}

/// Make `schema` invokable under its start tag in `library`.
///
/// In strict mode an invalid name or one already registered is a
/// configuration error; otherwise it is logged and the tag registered anyway.
pub fn register_tag(
    library: &mut Library,
    schema: &Arc<TagSchema>,
    env: &Environment,
) -> Result<(), TagError> {
    let name = schema.options().start_tag();

    if !is_valid_tag_name(name) {
        if env.strict() {
            return Err(TagError::Configuration(format!(
                "{}: '{name}' is not a valid tag name",
                schema.class_name()
            )));
        }
        tracing::warn!("{}: registering invalid tag name '{}'", schema.class_name(), name);
    }

    if library.has_tag(name) {
        if env.strict() {
            return Err(TagError::Configuration(format!(
                "{}: tag '{name}' is already registered",
                schema.class_name()
            )));
        }
        tracing::warn!("{}: overriding registered tag '{}'", schema.class_name(), name);
    }

    let compiled = Arc::clone(schema);
    let compile: CompileFn = Arc::new(move |parser: &mut Parser, token: &Token| {
        compiled
            .compile_node(parser, token)
            .map_err(TemplateError::from)
    });
    library.tag(name, compile);
    tracing::debug!("registered tag '{}' for {}", name, schema.class_name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Meta;

    fn schema(start_tag: &str) -> Arc<TagSchema> {
        TagSchema::builder("Card")
            .meta(Meta {
                start_tag: Some(start_tag.to_string()),
                ..Meta::default()
            })
            .build(&Environment::default())
            .unwrap()
    }

    #[test]
    fn test_registers_under_start_tag() {
        let mut library = Library::new();
        register_tag(&mut library, &schema("card"), &Environment::default()).unwrap();
        assert!(library.has_tag("card"));
        assert_eq!(library.tag_names().collect::<Vec<_>>(), vec!["card"]);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut library = Library::new();
        register_tag(&mut library, &schema("card"), &Environment::new(true)).unwrap();

        let err = register_tag(&mut library, &schema("card"), &Environment::new(true)).unwrap_err();
        assert!(matches!(err, TagError::Configuration(msg) if msg.contains("already registered")));

        register_tag(&mut library, &schema("card"), &Environment::new(false)).unwrap();
        assert_eq!(library.tag_names().count(), 1);
    }

    #[test]
    fn test_invalid_name() {
        let mut library = Library::new();
        let err =
            register_tag(&mut library, &schema("bad name"), &Environment::new(true)).unwrap_err();
        assert!(matches!(err, TagError::Configuration(_)));

        register_tag(&mut library, &schema("bad name"), &Environment::new(false)).unwrap();
    }

    #[test]
    fn test_namespaced_names_are_valid() {
        assert!(is_valid_tag_name("ui:card"));
        assert!(is_valid_tag_name("list_group"));
        assert!(!is_valid_tag_name(""));
        assert!(!is_valid_tag_name(":card"));
        assert!(!is_valid_tag_name("a%b"));
    }
}
