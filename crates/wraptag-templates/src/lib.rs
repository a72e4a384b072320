//! Minimal host template engine for wrapper tags.
//!
//! Provides the pieces a tag implementation talks to:
//! - [`Lexer`]: splits source into text, `{{ variable }}`, `{% block %}` and
//!   `{# comment #}` tokens
//! - [`Parser`]: builds a [`NodeList`], dispatching block tags to the compile
//!   functions registered in a [`Library`]
//! - [`FilterExpression`]: literals and dotted variable lookups with `|filter:arg`
//! - [`Context`]: the frame stack variables are resolved against
//! - [`Engine`] and [`Template`]: compile, load and render
//!
//! ## Example
//!
//! ```ignore
//! use wraptag_templates::{Context, Engine};
//!
//! let engine = Engine::builder(settings).library(library).build();
//! let template = engine.from_string("{% card title=\"Hi\" %}body{% end:card %}")?;
//! let html = template.render(&mut Context::new())?;
//! ```

mod context;
mod engine;
mod error;
mod expression;
pub mod filters;
mod lexer;
mod library;
pub mod loader;
pub mod nodelist;
mod parser;
mod quotes;
mod template;
mod tokens;
mod value;

pub use context::Context;
pub use engine::Engine;
pub use engine::EngineBuilder;
pub use error::TemplateError;
pub use expression::FilterExpression;
pub use expression::Operand;
pub use filters::FilterFn;
pub use lexer::Lexer;
pub use library::CompileFn;
pub use library::Library;
pub use loader::FileSystemLoader;
pub use loader::InMemoryLoader;
pub use loader::Loader;
pub use nodelist::Node;
pub use nodelist::NodeList;
pub use parser::Parser;
pub use template::Template;
pub use tokens::Token;
pub use tokens::TokenKind;
pub use value::Map;
pub use value::Object;
pub use value::Value;
