use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::error::TemplateError;
use crate::filters::FilterFn;
use crate::nodelist::Node;
use crate::parser::Parser;
use crate::tokens::Token;

/// Compile entry point for a block tag: receives the parser positioned after
/// the opening token and returns the node to render.
pub type CompileFn =
    Arc<dyn Fn(&mut Parser, &Token) -> Result<Box<dyn Node>, TemplateError> + Send + Sync>;

/// A named set of tags and filters an engine can use.
#[derive(Clone, Default)]
pub struct Library {
    tags: IndexMap<String, CompileFn>,
    filters: FxHashMap<String, FilterFn>,
}

impl Library {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `compile` under `name`, returning the entry it replaced.
    pub fn tag(&mut self, name: impl Into<String>, compile: CompileFn) -> Option<CompileFn> {
        self.tags.insert(name.into(), compile)
    }

    pub fn filter(&mut self, name: impl Into<String>, filter: FilterFn) -> Option<FilterFn> {
        self.filters.insert(name.into(), filter)
    }

    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    #[must_use]
    pub fn get_tag(&self, name: &str) -> Option<&CompileFn> {
        self.tags.get(name)
    }

    #[must_use]
    pub fn get_filter(&self, name: &str) -> Option<&FilterFn> {
        self.filters.get(name)
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut filters: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        filters.sort_unstable();
        f.debug_struct("Library")
            .field("tags", &self.tags.keys().collect::<Vec<_>>())
            .field("filters", &filters)
            .finish()
    }
}
