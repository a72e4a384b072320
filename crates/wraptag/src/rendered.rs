use std::any::Any;
use std::fmt;

use wraptag_templates::Map;
use wraptag_templates::Object;
use wraptag_templates::Value;

/// Output of a tag render.
///
/// Displays as exactly its content. The tag's render data and anything
/// `on_rendered` callbacks contributed stay reachable through [`Object::get`],
/// so templates can read `{{ result.events.on_click }}`.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedTag {
    content: String,
    tag: String,
    data: Map,
}

impl RenderedTag {
    pub fn new(content: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tag: tag.into(),
            data: Map::new(),
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Map) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// External name of the tag that produced this output.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn data(&self) -> &Map {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Map {
        &mut self.data
    }
}

impl fmt::Display for RenderedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl Object for RenderedTag {
    fn type_name(&self) -> &'static str {
        "rendered_tag"
    }

    fn get(&self, key: &str) -> Option<Value> {
        match key {
            "content" => Some(Value::from(self.content.as_str())),
            "tag" => Some(Value::from(self.tag.as_str())),
            _ => self.data.get(key).cloned(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_content_only() {
        let mut data = Map::new();
        data.insert("id".to_string(), Value::from("id_1"));
        let tag = RenderedTag::new("<b>hi</b>", "bold").with_data(data);
        assert_eq!(tag.to_string(), "<b>hi</b>");
        assert_eq!(format!("[{tag}]"), "[<b>hi</b>]");
    }

    #[test]
    fn test_lookup() {
        let mut events = Map::new();
        events.insert("on_click".to_string(), Value::from("go()"));
        let mut tag = RenderedTag::new("x", "button");
        tag.data_mut()
            .insert("events".to_string(), Value::Map(events));

        let value = Value::object(tag);
        assert_eq!(value.get("tag"), Some(Value::from("button")));
        assert_eq!(value.get("content"), Some(Value::from("x")));
        assert_eq!(
            value.get("events").and_then(|e| e.get("on_click")),
            Some(Value::from("go()"))
        );
        assert_eq!(value.get("missing"), None);
        assert_eq!(value.downcast_ref::<RenderedTag>().map(RenderedTag::tag), Some("button"));
    }

    #[test]
    fn test_blank_content_is_falsy() {
        assert!(!Value::object(RenderedTag::new("  \n", "empty")).is_truthy());
        assert!(Value::object(RenderedTag::new("x", "full")).is_truthy());
    }
}
