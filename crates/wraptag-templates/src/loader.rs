use std::fmt;
use std::fs;

use camino::Utf8Component;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use rustc_hash::FxHashMap;

use crate::error::TemplateError;

/// Source of named templates.
pub trait Loader: fmt::Debug + Send + Sync {
    fn load(&self, name: &str) -> Result<String, TemplateError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryLoader {
    templates: FxHashMap<String, String>,
}

impl InMemoryLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.templates.insert(name.into(), source.into());
        self
    }
}

impl Loader for InMemoryLoader {
    fn load(&self, name: &str) -> Result<String, TemplateError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::TemplateNotFound(name.to_string()))
    }
}

/// Loads templates from a list of directories, first match wins.
#[derive(Debug, Default, Clone)]
pub struct FileSystemLoader {
    dirs: Vec<Utf8PathBuf>,
}

impl FileSystemLoader {
    #[must_use]
    pub fn new(dirs: Vec<Utf8PathBuf>) -> Self {
        Self { dirs }
    }
}

/// Names must stay inside the template directory.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && Utf8Path::new(name)
            .components()
            .all(|component| matches!(component, Utf8Component::Normal(_)))
}

impl Loader for FileSystemLoader {
    fn load(&self, name: &str) -> Result<String, TemplateError> {
        if !is_safe_name(name) {
            return Err(TemplateError::TemplateNotFound(name.to_string()));
        }
        for dir in &self.dirs {
            let path = dir.join(name);
            if path.is_file() {
                tracing::debug!("Loading template '{}' from {}", name, path);
                return Ok(fs::read_to_string(&path)?);
            }
        }
        Err(TemplateError::TemplateNotFound(format!(
            "{name} (tried: {})",
            self.dirs
                .iter()
                .map(Utf8PathBuf::as_path)
                .map(Utf8Path::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}
