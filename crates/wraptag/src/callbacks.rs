//! Cross-cutting hooks run at two points of every render: after the argument
//! data is resolved (`on_data`) and after the body is rendered
//! (`on_rendered`).
//!
//! Callbacks see immutable snapshots and return entries to merge. A failing
//! callback is logged and skipped, it never aborts the render.

use std::fmt;
use std::sync::Arc;

use wraptag_templates::Context;
use wraptag_templates::Map;

use crate::rendered::RenderedTag;

/// Receives the cleaned argument data; returned entries are merged into it.
pub type DataCallback = Arc<dyn Fn(&Map, &Context) -> anyhow::Result<Map> + Send + Sync>;

/// Receives the rendered tag and its render data; returned entries are merged
/// into the rendered tag's data.
pub type RenderedCallback =
    Arc<dyn Fn(&RenderedTag, &Map, &Context) -> anyhow::Result<Map> + Send + Sync>;

#[derive(Clone)]
struct Registered<F> {
    id: Option<String>,
    callback: F,
}

fn connect<F>(list: &mut Vec<Registered<F>>, id: Option<&str>, callback: F) -> bool {
    if let Some(id) = id {
        if list.iter().any(|entry| entry.id.as_deref() == Some(id)) {
            return false;
        }
    }
    list.push(Registered {
        id: id.map(String::from),
        callback,
    });
    true
}

#[derive(Clone, Default)]
pub struct Callbacks {
    on_data: Vec<Registered<DataCallback>>,
    on_rendered: Vec<Registered<RenderedCallback>>,
}

impl Callbacks {
    /// Append an `on_data` callback. With an `id` already connected this is a
    /// no-op and returns `false`.
    pub fn connect_data(&mut self, id: Option<&str>, callback: DataCallback) -> bool {
        connect(&mut self.on_data, id, callback)
    }

    pub fn connect_rendered(&mut self, id: Option<&str>, callback: RenderedCallback) -> bool {
        connect(&mut self.on_rendered, id, callback)
    }

    /// Append every callback of `other`, skipping ids already connected.
    pub fn extend(&mut self, other: &Callbacks) {
        for entry in &other.on_data {
            connect(
                &mut self.on_data,
                entry.id.as_deref(),
                Arc::clone(&entry.callback),
            );
        }
        for entry in &other.on_rendered {
            connect(
                &mut self.on_rendered,
                entry.id.as_deref(),
                Arc::clone(&entry.callback),
            );
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.on_data.len() + self.on_rendered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the `on_data` callbacks in order, merging their entries into `data`.
    pub fn dispatch_data(&self, tag: &str, data: &mut Map, context: &Context) {
        for entry in &self.on_data {
            match (entry.callback)(data, context) {
                Ok(extra) => data.extend(extra),
                Err(err) => tracing::error!(
                    "on_data callback {} of tag '{}' failed: {:#}",
                    entry.id.as_deref().unwrap_or("<anonymous>"),
                    tag,
                    err
                ),
            }
        }
    }

    /// Run the `on_rendered` callbacks in order, merging their entries into
    /// the rendered tag's data.
    pub fn dispatch_rendered(&self, rendered: &mut RenderedTag, data: &Map, context: &Context) {
        for entry in &self.on_rendered {
            match (entry.callback)(rendered, data, context) {
                Ok(extra) => rendered.data_mut().extend(extra),
                Err(err) => tracing::error!(
                    "on_rendered callback {} of tag '{}' failed: {:#}",
                    entry.id.as_deref().unwrap_or("<anonymous>"),
                    rendered.tag(),
                    err
                ),
            }
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_data", &self.on_data.len())
            .field("on_rendered", &self.on_rendered.len())
            .finish()
    }
}
