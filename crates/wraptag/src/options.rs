use std::sync::Arc;

use serde::Deserialize;
use wraptag_templates::Engine;
use wraptag_templates::Template;
use wraptag_templates::TemplateError;

use crate::error::TagError;

/// Tag metadata as written by the tag author.
///
/// Deserializable so tag definitions can keep it in TOML:
///
/// ```toml
/// start_tag = "card"
/// namespace = "ui"
/// template_name = "ui/card.html"
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Meta {
    pub start_tag: Option<String>,
    pub end_tag: Option<String>,
    pub namespace: Option<String>,
    pub as_var_only: bool,
    pub template: Option<String>,
    pub template_name: Option<String>,
}

/// Normalized tag metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagOptions {
    start_tag: String,
    end_tag: String,
    namespace: Option<String>,
    as_var_only: bool,
    template: Option<String>,
    template_name: Option<String>,
}

impl TagOptions {
    #[must_use]
    pub fn derive(meta: &Meta, class_name: &str) -> Self {
        let namespace = meta
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .map(snake_case);

        let base = match meta.start_tag.as_deref() {
            Some(start_tag) => start_tag,
            None => strip_tag_suffix(class_name),
        };
        let mut start_tag = snake_case(base);
        if let Some(namespace) = &namespace {
            start_tag = format!("{namespace}:{start_tag}");
        }

        let end_tag = meta
            .end_tag
            .clone()
            .filter(|end| !end.is_empty())
            .unwrap_or_else(|| format!("end:{start_tag}"));

        Self {
            start_tag,
            end_tag,
            namespace,
            as_var_only: meta.as_var_only,
            template: meta.template.clone(),
            template_name: meta.template_name.clone(),
        }
    }

    #[must_use]
    pub fn start_tag(&self) -> &str {
        &self.start_tag
    }

    #[must_use]
    pub fn end_tag(&self) -> &str {
        &self.end_tag
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    #[must_use]
    pub fn as_var_only(&self) -> bool {
        self.as_var_only
    }

    /// The inline template if set, else the named one loaded through `engine`.
    pub fn get_template(&self, engine: &Arc<Engine>) -> Result<Template, TagError> {
        if let Some(source) = &self.template {
            return Ok(engine.from_string(source)?);
        }
        if let Some(name) = &self.template_name {
            return engine.get_template(name).map_err(|err| match err {
                TemplateError::TemplateNotFound(_) => TagError::TemplateNotFound(name.clone()),
                err => TagError::Template(err),
            });
        }
        Err(TagError::TemplateNotFound(format!(
            "tag '{}' has neither template nor template_name",
            self.start_tag
        )))
    }
}

fn strip_tag_suffix(name: &str) -> &str {
    if name.len() > 3 {
        let split = name.len() - 3;
        if let (Some(head), Some(tail)) = (name.get(..split), name.get(split..)) {
            if tail.eq_ignore_ascii_case("tag") {
                return head;
            }
        }
    }
    name
}

/// `ButtonGroup` → `button_group`, `data-toggle` → `data_toggle`.
///
/// Separators (`-`, `.`, whitespace) become `_`; the first character is
/// lowercased and every later uppercase character becomes `_` plus its
/// lowercase form.
#[must_use]
pub fn snake_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for (i, ch) in value.chars().enumerate() {
        let ch = if ch == '-' || ch == '.' || ch.is_whitespace() {
            '_'
        } else {
            ch
        };
        if i == 0 {
            out.extend(ch.to_lowercase());
        } else if ch.is_uppercase() {
            out.push('_');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
