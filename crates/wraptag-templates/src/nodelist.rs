use std::any::Any;
use std::fmt;

use crate::context::Context;
use crate::error::TemplateError;
use crate::expression::FilterExpression;

/// A compiled piece of a template.
pub trait Node: fmt::Debug + Send + Sync + 'static {
    fn render(&self, context: &mut Context) -> Result<String, TemplateError>;

    /// Node lists nested inside this node, searched by [`NodeList::nodes_of_type`].
    fn child_nodelists(&self) -> Vec<&NodeList> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Default)]
pub struct NodeList(Vec<Box<dyn Node>>);

impl NodeList {
    #[must_use]
    pub fn new(nodes: Vec<Box<dyn Node>>) -> Self {
        Self(nodes)
    }

    pub fn push(&mut self, node: Box<dyn Node>) {
        self.0.push(node);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn render(&self, context: &mut Context) -> Result<String, TemplateError> {
        let mut out = String::new();
        for node in &self.0 {
            out.push_str(&node.render(context)?);
        }
        Ok(out)
    }

    /// Every node of type `T`, depth first, including nested node lists.
    #[must_use]
    pub fn nodes_of_type<T: Node>(&self) -> Vec<&T> {
        let mut found = Vec::new();
        for node in &self.0 {
            if let Some(typed) = node.as_any().downcast_ref::<T>() {
                found.push(typed);
            }
            for child in node.child_nodelists() {
                found.extend(child.nodes_of_type::<T>());
            }
        }
        found
    }
}

#[derive(Debug)]
pub struct TextNode(String);

impl TextNode {
    #[must_use]
    pub fn new(text: String) -> Self {
        Self(text)
    }
}

impl Node for TextNode {
    fn render(&self, _context: &mut Context) -> Result<String, TemplateError> {
        Ok(self.0.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct VariableNode(FilterExpression);

impl VariableNode {
    #[must_use]
    pub fn new(expression: FilterExpression) -> Self {
        Self(expression)
    }
}

impl Node for VariableNode {
    fn render(&self, context: &mut Context) -> Result<String, TemplateError> {
        match self.0.resolve(context) {
            Ok(value) => Ok(value.to_string()),
            Err(TemplateError::VariableDoesNotExist(name)) => {
                tracing::trace!("variable '{}' does not exist", name);
                Ok(context
                    .engine()
                    .map(|engine| engine.settings().string_if_invalid().to_string())
                    .unwrap_or_default())
            }
            Err(err) => Err(err),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
