use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use wraptag_templates::Context;
use wraptag_templates::Map;
use wraptag_templates::Value;

use crate::argument::Argument;
use crate::error::HookError;

/// Per-argument clean hook, registered as `clean_<name>`.
pub type CleanHook = Arc<dyn Fn(&Argument, Value) -> Result<Value, HookError> + Send + Sync>;

/// Per-argument render hook, registered as `render_<name>`. Receives the
/// complete argument data of the tag being rendered.
pub type RenderHook =
    Arc<dyn Fn(&Argument, &Map, &Context) -> Result<Option<Value>, HookError> + Send + Sync>;

fn unimplemented_clean(_argument: &Argument, _value: Value) -> Result<Value, HookError> {
    Err(HookError::NotImplemented)
}

fn unimplemented_render(
    _argument: &Argument,
    _data: &Map,
    _context: &Context,
) -> Result<Option<Value>, HookError> {
    Err(HookError::NotImplemented)
}

/// Hooks an argument calls during a render, resolved when it is contributed
/// to a schema.
#[derive(Clone)]
pub struct ArgumentHooks {
    pub(crate) clean: CleanHook,
    pub(crate) render: RenderHook,
}

impl Default for ArgumentHooks {
    fn default() -> Self {
        Self {
            clean: Arc::new(unimplemented_clean),
            render: Arc::new(unimplemented_render),
        }
    }
}

impl fmt::Debug for ArgumentHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentHooks").finish_non_exhaustive()
    }
}

/// Hooks registered on a schema or fragment, keyed by method name.
#[derive(Clone, Default)]
pub struct HookTable {
    clean: FxHashMap<String, CleanHook>,
    render: FxHashMap<String, RenderHook>,
}

impl HookTable {
    pub fn clean(&mut self, name: impl Into<String>, hook: CleanHook) {
        self.clean.insert(name.into(), hook);
    }

    pub fn render(&mut self, name: impl Into<String>, hook: RenderHook) {
        self.render.insert(name.into(), hook);
    }

    /// Add every hook of `other`, replacing hooks with the same name.
    pub fn extend(&mut self, other: &HookTable) {
        self.clean
            .extend(other.clean.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));
        self.render
            .extend(other.render.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));
    }

    /// Hooks for `argument`, falling back to the unimplemented defaults.
    #[must_use]
    pub fn resolve(&self, argument: &Argument) -> ArgumentHooks {
        let fallback = ArgumentHooks::default();
        ArgumentHooks {
            clean: self
                .clean
                .get(&argument.clean_method_name())
                .cloned()
                .unwrap_or(fallback.clean),
            render: self
                .render
                .get(&argument.render_method_name())
                .cloned()
                .unwrap_or(fallback.render),
        }
    }

    pub fn clean_names(&self) -> impl Iterator<Item = &str> {
        self.clean.keys().map(String::as_str)
    }

    pub fn render_names(&self) -> impl Iterator<Item = &str> {
        self.render.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clean.len() + self.render.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut clean: Vec<_> = self.clean_names().collect();
        let mut render: Vec<_> = self.render_names().collect();
        clean.sort_unstable();
        render.sort_unstable();
        f.debug_struct("HookTable")
            .field("clean", &clean)
            .field("render", &render)
            .finish()
    }
}
