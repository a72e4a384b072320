use wraptag_conf::Settings;

use crate::globstr::GlobCache;

/// Process-wide state shared by schema construction and registration.
///
/// Holds the strict flag and the glob cache instead of module-level globals.
/// Create one at startup, usually from [`Settings`], and pass it to
/// [`TagSchemaBuilder::build`](crate::TagSchemaBuilder::build) and
/// [`register_tag`](crate::register_tag).
#[derive(Debug, Default)]
pub struct Environment {
    strict: bool,
    globs: GlobCache,
}

impl Environment {
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            globs: GlobCache::new(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.debug())
    }

    /// Misnamed hooks and registration conflicts are errors when set.
    #[must_use]
    pub fn strict(&self) -> bool {
        self.strict
    }

    #[must_use]
    pub fn globs(&self) -> &GlobCache {
        &self.globs
    }

    /// Drop every cached glob pattern.
    pub fn reset(&self) {
        tracing::debug!("clearing {} cached glob patterns", self.globs.len());
        self.globs.clear();
    }
}
