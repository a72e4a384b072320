use std::sync::Arc;

use crate::engine::Engine;
use crate::value::Map;
use crate::value::Value;

/// Stack of variable frames used while rendering.
///
/// Lookups search from the most recent frame down; writes go to the most
/// recent frame. Frames are pushed and popped in strict LIFO order by the
/// code that renders a scope.
#[derive(Debug, Default)]
pub struct Context {
    frames: Vec<Map>,
    engine: Option<Arc<Engine>>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![Map::new()],
            engine: None,
        }
    }

    /// Engine of the template being rendered, bound on first render.
    #[must_use]
    pub fn engine(&self) -> Option<&Arc<Engine>> {
        self.engine.as_ref()
    }

    pub fn bind_engine(&mut self, engine: Arc<Engine>) {
        if self.engine.is_none() {
            self.engine = Some(engine);
        }
    }

    pub fn push(&mut self, frame: Map) {
        self.frames.push(frame);
    }

    /// Discard the most recent frame. The base frame is never removed.
    pub fn pop(&mut self) -> Option<Map> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Render `f` with `frame` pushed, returning its result together with the
    /// frame as it was left when `f` finished.
    pub fn scoped<R>(&mut self, frame: Map, f: impl FnOnce(&mut Self) -> R) -> (R, Map) {
        let depth = self.frames.len();
        self.push(frame);
        let result = f(self);
        // Frames pushed inside `f` and never popped are discarded with ours.
        self.frames.truncate(depth + 1);
        let frame = self.frames.pop().unwrap_or_default();
        (result, frame)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(key))
    }

    /// Mutable access to the nearest frame entry named `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(key))
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        if self.frames.is_empty() {
            self.frames.push(Map::new());
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(key.into(), value.into());
        }
    }

    /// All visible variables merged into one map, most recent frame winning.
    #[must_use]
    pub fn flatten(&self) -> Map {
        let mut flat = Map::new();
        for frame in &self.frames {
            for (key, value) in frame {
                flat.insert(key.clone(), value.clone());
            }
        }
        flat
    }
}

impl From<Map> for Context {
    fn from(frame: Map) -> Self {
        Self {
            frames: vec![frame],
            engine: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(key: &str, value: &str) -> Map {
        let mut map = Map::new();
        map.insert(key.to_string(), Value::from(value));
        map
    }

    #[test]
    fn test_lookup_most_recent_first() {
        let mut ctx = Context::from(frame("title", "outer"));
        ctx.push(frame("title", "inner"));
        assert_eq!(ctx.get("title"), Some(&Value::from("inner")));
        ctx.pop();
        assert_eq!(ctx.get("title"), Some(&Value::from("outer")));
    }

    #[test]
    fn test_base_frame_survives_pop() {
        let mut ctx = Context::new();
        assert!(ctx.pop().is_none());
        assert_eq!(ctx.depth(), 1);
        ctx.set("a", 1);
        assert_eq!(ctx.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_scoped_is_symmetric() {
        let mut ctx = Context::new();
        let (seen, left) = ctx.scoped(frame("scoped", "yes"), |ctx| {
            ctx.push(frame("leaked", "no"));
            ctx.set("written", "inside");
            ctx.get("scoped").cloned()
        });
        assert_eq!(seen, Some(Value::from("yes")));
        assert_eq!(ctx.depth(), 1);
        assert!(!ctx.contains("scoped"));
        assert!(!ctx.contains("leaked"));
        assert_eq!(left.get("scoped"), Some(&Value::from("yes")));
        assert!(left.get("written").is_none());
    }

    #[test]
    fn test_get_mut_targets_nearest_frame() {
        let mut ctx = Context::from(frame("items", "base"));
        ctx.push(Map::new());
        if let Some(value) = ctx.get_mut("items") {
            *value = Value::from("changed");
        }
        ctx.pop();
        assert_eq!(ctx.get("items"), Some(&Value::from("changed")));
    }

    #[test]
    fn test_flatten() {
        let mut ctx = Context::from(frame("a", "1"));
        ctx.push(frame("a", "2"));
        ctx.push(frame("b", "3"));
        let flat = ctx.flatten();
        assert_eq!(flat.get("a"), Some(&Value::from("2")));
        assert_eq!(flat.len(), 2);
    }
}
