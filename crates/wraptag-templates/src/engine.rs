use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use wraptag_conf::Settings;

use crate::error::TemplateError;
use crate::filters;
use crate::filters::FilterFn;
use crate::lexer::Lexer;
use crate::library::CompileFn;
use crate::library::Library;
use crate::loader::FileSystemLoader;
use crate::loader::Loader;
use crate::parser::Parser;
use crate::template::Template;

/// Compiles and loads templates against a fixed set of libraries and loaders.
pub struct Engine {
    settings: Settings,
    libraries: Vec<Library>,
    builtin_filters: FxHashMap<String, FilterFn>,
    loaders: Vec<Box<dyn Loader>>,
}

pub struct EngineBuilder {
    settings: Settings,
    libraries: Vec<Library>,
    loaders: Vec<Box<dyn Loader>>,
}

impl EngineBuilder {
    #[must_use]
    pub fn library(mut self, library: Library) -> Self {
        self.libraries.push(library);
        self
    }

    #[must_use]
    pub fn loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }

    /// Without explicit loaders, templates are read from the configured
    /// `template_dirs`.
    #[must_use]
    pub fn build(self) -> Arc<Engine> {
        let mut loaders = self.loaders;
        if loaders.is_empty() {
            loaders.push(Box::new(FileSystemLoader::new(
                self.settings.template_dirs().to_vec(),
            )));
        }
        Arc::new(Engine {
            settings: self.settings,
            libraries: self.libraries,
            builtin_filters: filters::builtins(),
            loaders,
        })
    }
}

impl Engine {
    #[must_use]
    pub fn builder(settings: Settings) -> EngineBuilder {
        EngineBuilder {
            settings,
            libraries: Vec::new(),
            loaders: Vec::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Strict mode flag, see [`Settings::debug`].
    #[must_use]
    pub fn debug(&self) -> bool {
        self.settings.debug()
    }

    /// Later libraries shadow earlier ones.
    #[must_use]
    pub fn find_tag(&self, name: &str) -> Option<CompileFn> {
        self.libraries
            .iter()
            .rev()
            .find_map(|library| library.get_tag(name))
            .cloned()
    }

    #[must_use]
    pub fn find_filter(&self, name: &str) -> Option<FilterFn> {
        self.libraries
            .iter()
            .rev()
            .find_map(|library| library.get_filter(name))
            .or_else(|| self.builtin_filters.get(name))
            .cloned()
    }

    pub fn from_string(self: &Arc<Self>, source: &str) -> Result<Template, TemplateError> {
        self.compile(source, None)
    }

    pub fn get_template(self: &Arc<Self>, name: &str) -> Result<Template, TemplateError> {
        let mut tried = Vec::new();
        for loader in &self.loaders {
            match loader.load(name) {
                Ok(source) => return self.compile(&source, Some(name.to_string())),
                Err(TemplateError::TemplateNotFound(detail)) => tried.push(detail),
                Err(err) => return Err(err),
            }
        }
        tracing::debug!("Template '{}' not found, tried: {:?}", name, tried);
        Err(TemplateError::TemplateNotFound(name.to_string()))
    }

    fn compile(
        self: &Arc<Self>,
        source: &str,
        name: Option<String>,
    ) -> Result<Template, TemplateError> {
        let tokens = Lexer::new(source).tokenize();
        let nodelist = Parser::new(tokens, Arc::clone(self)).parse(&[])?;
        Ok(Template::new(nodelist, Arc::clone(self), name))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("settings", &self.settings)
            .field("libraries", &self.libraries)
            .field("loaders", &self.loaders)
            .finish_non_exhaustive()
    }
}
