use std::sync::Arc;

use crate::context::Context;
use crate::engine::Engine;
use crate::error::TemplateError;
use crate::nodelist::NodeList;

#[derive(Debug)]
pub struct Template {
    nodelist: NodeList,
    engine: Arc<Engine>,
    name: Option<String>,
}

impl Template {
    pub(crate) fn new(nodelist: NodeList, engine: Arc<Engine>, name: Option<String>) -> Self {
        Self {
            nodelist,
            engine,
            name,
        }
    }

    #[must_use]
    pub fn nodelist(&self) -> &NodeList {
        &self.nodelist
    }

    /// The compiled nodes, for callers that render into a context whose
    /// engine is already bound.
    #[must_use]
    pub fn into_nodelist(self) -> NodeList {
        self.nodelist
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Loader name, `None` for templates compiled from a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn render(&self, context: &mut Context) -> Result<String, TemplateError> {
        context.bind_engine(Arc::clone(&self.engine));
        self.nodelist.render(context)
    }
}
