//! Declarative wrapper tags for the `wraptag-templates` engine.
//!
//! A tag is a [`TagSchema`]: named [`Argument`]s describing how tag bits are
//! claimed, cleaned, validated and rendered, plus metadata naming the tag and
//! its template. Schemas compose by extending a base schema and mixing in
//! [`Fragment`]s; arguments keep declaration order and a redeclared argument
//! keeps its original position.
//!
//! ```ignore
//! let env = Environment::from_settings(&settings);
//! let card = TagSchema::builder("CardTag")
//!     .mixin(mixins::identity())
//!     .argument("title", Argument::keyword().help_text("Card heading"))
//!     .meta(Meta { template_name: Some("card.html".into()), ..Meta::default() })
//!     .build(&env)?;
//! register_tag(&mut library, &card, &env)?;
//! ```
//!
//! which makes `{% card title="Hi" %}body{% end:card %}` available to
//! templates, or `{% card %}...{% end:card as result %}` to bind the
//! [`RenderedTag`] instead of emitting it.

pub mod argument;
pub mod callbacks;
pub mod docgen;
mod environment;
mod error;
pub mod globstr;
mod hooks;
pub mod mixins;
mod options;
mod register;
mod rendered;
mod schema;
pub mod tag;
pub mod validators;

pub use argument::Argument;
pub use argument::ArgumentKind;
pub use argument::Claim;
pub use argument::Validator;
pub use callbacks::Callbacks;
pub use callbacks::DataCallback;
pub use callbacks::RenderedCallback;
pub use environment::Environment;
pub use error::HookError;
pub use error::TagError;
pub use error::ValidationError;
pub use hooks::CleanHook;
pub use hooks::HookTable;
pub use hooks::RenderHook;
pub use options::snake_case;
pub use options::Meta;
pub use options::TagOptions;
pub use register::register_tag;
pub use rendered::RenderedTag;
pub use schema::BodyRenderer;
pub use schema::Fragment;
pub use schema::TagSchema;
pub use schema::TagSchemaBuilder;
pub use tag::TagNode;
