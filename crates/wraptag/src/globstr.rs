//! Glob patterns for keyword group names.
//!
//! A glob is a literal keyword name with placeholders:
//!
//! | placeholder | matches                      |
//! |-------------|------------------------------|
//! | `<int>`     | `\d+`                        |
//! | `<str>`     | `[a-zA-Z]+`                  |
//! | `<ident>`   | `[a-zA-Z]{1}[a-zA-Z_\-0-9]+` |
//!
//! Patterns are anchored, so `url_arg_<int>` matches `url_arg_1` but not
//! `url_arg_1x`.

use std::sync::Mutex;
use std::sync::PoisonError;

use regex::Regex;
use rustc_hash::FxHashMap;

/// Translate a glob into an anchored regular expression.
#[must_use]
pub fn quote(glob: &str) -> String {
    let pattern = glob
        .replace("<int>", r"\d+")
        .replace("<str>", "[a-zA-Z]+")
        .replace("<ident>", r"[a-zA-Z]{1}[a-zA-Z_\-0-9]+");
    format!("^{pattern}$")
}

/// Compiled glob patterns, shared by every schema built in one [`Environment`].
///
/// [`Environment`]: crate::Environment
#[derive(Debug, Default)]
pub struct GlobCache {
    compiled: Mutex<FxHashMap<String, Regex>>,
}

impl GlobCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled regex for `glob`, compiling and caching it on first use.
    pub fn get(&self, glob: &str) -> Result<Regex, regex::Error> {
        let mut compiled = self.compiled.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(regex) = compiled.get(glob) {
            return Ok(regex.clone());
        }
        let regex = Regex::new(&quote(glob))?;
        compiled.insert(glob.to_string(), regex.clone());
        Ok(regex)
    }

    pub fn clear(&self) {
        self.compiled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.compiled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
