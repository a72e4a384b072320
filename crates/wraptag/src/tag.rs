use std::any::Any;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use indexmap::IndexMap;
use wraptag_templates::Context;
use wraptag_templates::Map;
use wraptag_templates::Node;
use wraptag_templates::NodeList;
use wraptag_templates::TemplateError;
use wraptag_templates::Value;

use crate::argument::Argument;
use crate::argument::Claim;
use crate::error::TagError;
use crate::rendered::RenderedTag;
use crate::schema::TagSchema;

/// Context key under which a tag exposes its render data to nested tags.
pub const WRAPPER_TAG_KEY: &str = "wrapper_tag";
/// Render data key holding the enclosing tag's render data.
pub const PARENT_KEY: &str = "parent";
/// Context key holding the rendered child content inside the tag template.
pub const CONTENT_KEY: &str = "content";
/// Render data key holding the cleaned and rendered argument values.
pub const ARGUMENTS_KEY: &str = "arguments";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A fresh `id_<n>` identifier, unique for the life of the process.
#[must_use]
pub fn generate_id() -> String {
    format!("id_{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Render data of the enclosing tag, for tags that report back to their
/// parent (list items registering with their list, for example).
pub fn parent_data_mut(context: &mut Context) -> Option<&mut Map> {
    context.get_mut(WRAPPER_TAG_KEY).and_then(Value::as_map_mut)
}

/// One compiled occurrence of a tag.
#[derive(Debug)]
pub struct TagNode {
    schema: Arc<TagSchema>,
    arguments: IndexMap<String, Argument>,
    claims: Vec<Claim>,
    nodelist: NodeList,
    varname: Option<String>,
}

impl TagNode {
    pub(crate) fn new(
        schema: Arc<TagSchema>,
        arguments: IndexMap<String, Argument>,
        claims: Vec<Claim>,
        nodelist: NodeList,
        varname: Option<String>,
    ) -> Self {
        Self {
            schema,
            arguments,
            claims,
            nodelist,
            varname,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<TagSchema> {
        &self.schema
    }

    /// This occurrence's private copy of the schema's arguments.
    #[must_use]
    pub fn arguments(&self) -> &IndexMap<String, Argument> {
        &self.arguments
    }

    #[must_use]
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    #[must_use]
    pub fn nodelist(&self) -> &NodeList {
        &self.nodelist
    }

    #[must_use]
    pub fn varname(&self) -> Option<&str> {
        self.varname.as_deref()
    }

    /// Resolve, clean and render every argument.
    ///
    /// The result carries `id`, `name`, `arguments` and, when nested, the
    /// enclosing tag's render data under `parent`.
    pub fn render_data(&self, context: &Context, parent: Option<Value>) -> Result<Map, TagError> {
        let start_tag = self.schema.options().start_tag();

        let mut arguments = Map::new();
        for (argument, claim) in self.arguments.values().zip(&self.claims) {
            let value = argument.resolve(context, claim);
            let value = argument.full_clean(value);
            if !value.is_none() {
                arguments.insert(argument.name().to_string(), value);
            }
        }

        self.schema
            .callbacks()
            .dispatch_data(start_tag, &mut arguments, context);

        let mut rendered = Map::new();
        for argument in self.arguments.values() {
            if let Some(value) = argument.render(context, &arguments)? {
                rendered.insert(format!("{}__rendered", argument.name()), value);
            }
        }
        arguments.extend(rendered);

        let mut data = Map::new();
        data.insert("id".to_string(), Value::Str(generate_id()));
        data.insert("name".to_string(), Value::from(start_tag));
        data.insert(ARGUMENTS_KEY.to_string(), Value::Map(arguments));
        if let Some(parent) = parent.filter(|parent| !parent.is_none()) {
            data.insert(PARENT_KEY.to_string(), parent);
        }
        Ok(data)
    }

    /// Full render of this occurrence: data, children, body, callbacks and
    /// the optional binding.
    pub fn render_tag(&self, context: &mut Context) -> Result<String, TagError> {
        let start_tag = self.schema.options().start_tag();
        let parent = context.get(WRAPPER_TAG_KEY).cloned();
        let data = self.render_data(context, parent)?;
        tracing::debug!("rendering '{}' with {:?}", start_tag, data);

        let mut frame = Map::new();
        frame.insert(WRAPPER_TAG_KEY.to_string(), Value::Map(data));
        let (content, mut frame) = context.scoped(frame, |context| self.nodelist.render(context));
        let content = content?;

        // Children may have written into our data through `parent_data_mut`.
        let data = match frame.shift_remove(WRAPPER_TAG_KEY) {
            Some(Value::Map(data)) => data,
            _ => {
                return Err(TagError::Render(format!(
                    "'{start_tag}': '{WRAPPER_TAG_KEY}' was replaced while rendering children"
                )))
            }
        };

        let mut rendered = match self.schema.body() {
            Some(body) => body(self, context, content, &data)?,
            None => default_body(self, context, content, &data)?,
        };
        self.schema
            .callbacks()
            .dispatch_rendered(&mut rendered, &data, context);

        match &self.varname {
            Some(varname) => {
                context.set(varname.clone(), Value::object(rendered));
                Ok(String::new())
            }
            None => Ok(rendered.to_string()),
        }
    }
}

/// Render the tag's configured template with the argument values, `content`
/// and `wrapper_tag` pushed onto the context.
pub fn default_body(
    node: &TagNode,
    context: &mut Context,
    content: String,
    data: &Map,
) -> Result<RenderedTag, TagError> {
    let options = node.schema().options();
    let engine = context.engine().cloned().ok_or_else(|| {
        TagError::Configuration(format!(
            "tag '{}' rendered outside of a template engine",
            options.start_tag()
        ))
    })?;
    let nodelist = node.schema().compiled_template(&engine)?;

    let mut frame = data
        .get(ARGUMENTS_KEY)
        .and_then(Value::as_map)
        .cloned()
        .unwrap_or_default();
    frame.insert(CONTENT_KEY.to_string(), Value::Str(content));
    frame.insert(WRAPPER_TAG_KEY.to_string(), Value::Map(data.clone()));

    let (html, _) = context.scoped(frame, |context| nodelist.render(context));
    Ok(RenderedTag::new(html?, options.start_tag()).with_data(data.clone()))
}

impl Node for TagNode {
    fn render(&self, context: &mut Context) -> Result<String, TemplateError> {
        self.render_tag(context).map_err(TemplateError::from)
    }

    fn child_nodelists(&self) -> Vec<&NodeList> {
        vec![&self.nodelist]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
