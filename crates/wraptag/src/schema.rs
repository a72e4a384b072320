use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::Weak;

use indexmap::IndexMap;
use wraptag_templates::Context;
use wraptag_templates::Engine;
use wraptag_templates::FilterExpression;
use wraptag_templates::Map;
use wraptag_templates::Node;
use wraptag_templates::NodeList;
use wraptag_templates::Parser;
use wraptag_templates::Token;

use crate::argument::Argument;
use crate::argument::KeywordPool;
use crate::argument::PositionalPool;
use crate::callbacks::Callbacks;
use crate::callbacks::DataCallback;
use crate::callbacks::RenderedCallback;
use crate::environment::Environment;
use crate::error::TagError;
use crate::hooks::CleanHook;
use crate::hooks::HookTable;
use crate::hooks::RenderHook;
use crate::options::Meta;
use crate::options::TagOptions;
use crate::rendered::RenderedTag;
use crate::tag::TagNode;

/// Renders the body of a tag from its render data and child content.
pub type BodyRenderer =
    Arc<dyn Fn(&TagNode, &mut Context, String, &Map) -> Result<RenderedTag, TagError> + Send + Sync>;

/// A reusable set of arguments, hooks and callbacks that schemas mix in.
#[derive(Clone, Default)]
pub struct Fragment {
    name: String,
    arguments: Vec<(String, Argument)>,
    hooks: HookTable,
    callbacks: Callbacks,
}

impl Fragment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, argument: Argument) -> Self {
        let name = name.into();
        self.arguments.push((name.clone(), argument.named(name)));
        self
    }

    #[must_use]
    pub fn clean(mut self, method: impl Into<String>, hook: CleanHook) -> Self {
        self.hooks.clean(method, hook);
        self
    }

    #[must_use]
    pub fn render(mut self, method: impl Into<String>, hook: RenderHook) -> Self {
        self.hooks.render(method, hook);
        self
    }

    #[must_use]
    pub fn on_data(mut self, id: Option<&str>, callback: DataCallback) -> Self {
        self.callbacks.connect_data(id, callback);
        self
    }

    #[must_use]
    pub fn on_rendered(mut self, id: Option<&str>, callback: RenderedCallback) -> Self {
        self.callbacks.connect_rendered(id, callback);
        self
    }

    fn sorted_arguments(&self) -> Vec<(String, Argument)> {
        let mut arguments = self.arguments.clone();
        arguments.sort_by_key(|(_, argument)| argument.creation_counter());
        arguments
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("name", &self.name)
            .field(
                "arguments",
                &self.arguments.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("hooks", &self.hooks)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

/// Immutable description of one tag type, shared by all its occurrences.
pub struct TagSchema {
    class_name: String,
    meta: Meta,
    options: TagOptions,
    arguments: IndexMap<String, Argument>,
    hooks: HookTable,
    callbacks: Callbacks,
    body: Option<BodyRenderer>,
    compiled: Mutex<Option<CompiledTemplate>>,
}

/// The tag template compiled against one engine.
struct CompiledTemplate {
    engine: Weak<Engine>,
    nodelist: Arc<NodeList>,
}

pub struct TagSchemaBuilder {
    class_name: String,
    base: Option<Arc<TagSchema>>,
    fragments: Vec<Fragment>,
    own: Fragment,
    meta: Option<Meta>,
    body: Option<BodyRenderer>,
}

impl TagSchema {
    pub fn builder(class_name: impl Into<String>) -> TagSchemaBuilder {
        let class_name = class_name.into();
        TagSchemaBuilder {
            own: Fragment::new(class_name.clone()),
            class_name,
            base: None,
            fragments: Vec::new(),
            meta: None,
            body: None,
        }
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[must_use]
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    #[must_use]
    pub fn options(&self) -> &TagOptions {
        &self.options
    }

    /// Merged arguments in declaration order.
    #[must_use]
    pub fn arguments(&self) -> &IndexMap<String, Argument> {
        &self.arguments
    }

    #[must_use]
    pub fn hooks(&self) -> &HookTable {
        &self.hooks
    }

    #[must_use]
    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    pub(crate) fn body(&self) -> Option<&BodyRenderer> {
        self.body.as_ref()
    }

    /// The tag template's nodes, compiled on first use and reused for as long
    /// as renders go through the same engine.
    pub fn compiled_template(&self, engine: &Arc<Engine>) -> Result<Arc<NodeList>, TagError> {
        let mut compiled = self
            .compiled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = compiled.as_ref() {
            if cached
                .engine
                .upgrade()
                .is_some_and(|cached_engine| Arc::ptr_eq(&cached_engine, engine))
            {
                return Ok(Arc::clone(&cached.nodelist));
            }
        }

        let nodelist = Arc::new(self.options.get_template(engine)?.into_nodelist());
        tracing::debug!("compiled template of '{}'", self.options.start_tag());
        *compiled = Some(CompiledTemplate {
            engine: Arc::downgrade(engine),
            nodelist: Arc::clone(&nodelist),
        });
        Ok(nodelist)
    }

    /// Compile entry point for one occurrence of this tag.
    ///
    /// Consumes child nodes up to and including the end tag. The binding
    /// clause `as <name>` may close either the opening or the closing tag.
    pub fn compile(self: &Arc<Self>, parser: &mut Parser, token: &Token) -> Result<TagNode, TagError> {
        let start_tag = self.options.start_tag();
        let strict = parser.engine().debug();

        let mut bits = token.split_contents();
        if !bits.is_empty() {
            bits.remove(0);
        }
        let mut varname = take_binding(&mut bits);

        let nodelist = parser.parse(&[self.options.end_tag()])?;
        if let Some(end) = parser.next_token() {
            let mut end_bits = end.split_contents();
            if let Some(name) = take_binding(&mut end_bits) {
                if varname.is_some() {
                    return Err(TagError::Syntax(format!(
                        "'{start_tag}' binds its result on both the opening and closing tag"
                    )));
                }
                varname = Some(name);
            }
            if end_bits.len() > 1 {
                return Err(TagError::Syntax(format!(
                    "'{}' takes no arguments besides 'as <name>'",
                    self.options.end_tag()
                )));
            }
        }

        let (mut positionals, mut keywords) = parse_bits(parser, &bits, start_tag)?;

        let arguments = self.arguments.clone();
        let mut claims = Vec::with_capacity(arguments.len());
        for argument in arguments.values() {
            claims.push(argument.claim(&mut positionals, &mut keywords)?);
        }

        if !positionals.is_empty() || !keywords.is_empty() {
            let args: Vec<&str> = positionals.iter().map(FilterExpression::token).collect();
            let kwargs: Vec<&str> = keywords.keys().map(String::as_str).collect();
            if strict {
                if !args.is_empty() {
                    return Err(TagError::Syntax(format!(
                        "Tag `{start_tag}` received unhandled args: {args:?}"
                    )));
                }
                return Err(TagError::Syntax(format!(
                    "Tag `{start_tag}` received unhandled kwargs: {kwargs:?}"
                )));
            }
            tracing::debug!(
                "tag '{}' ignoring unhandled args {:?} and kwargs {:?}",
                start_tag,
                args,
                kwargs
            );
        }

        if strict && self.options.as_var_only() && varname.is_none() {
            return Err(TagError::Configuration(format!(
                "Tag `{start_tag}` can only be rendered to a variable using `as <name>`"
            )));
        }

        tracing::debug!(
            "compiled '{}' on line {} with {} arguments",
            start_tag,
            token.line(),
            arguments.len()
        );
        Ok(TagNode::new(
            Arc::clone(self),
            arguments,
            claims,
            nodelist,
            varname,
        ))
    }

    /// [`TagSchema::compile`] shaped as a host compile function.
    pub(crate) fn compile_node(
        self: &Arc<Self>,
        parser: &mut Parser,
        token: &Token,
    ) -> Result<Box<dyn Node>, TagError> {
        Ok(Box::new(self.compile(parser, token)?))
    }
}

impl fmt::Debug for TagSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagSchema")
            .field("class_name", &self.class_name)
            .field("options", &self.options)
            .field("arguments", &self.arguments.keys().collect::<Vec<_>>())
            .field("hooks", &self.hooks)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

impl TagSchemaBuilder {
    /// Inherit arguments, hooks, callbacks, body renderer and metadata.
    #[must_use]
    pub fn extends(mut self, base: &Arc<TagSchema>) -> Self {
        self.base = Some(Arc::clone(base));
        self
    }

    /// Mix in a fragment. Fragments merge after the base, in the order given.
    #[must_use]
    pub fn mixin(mut self, fragment: Fragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, argument: Argument) -> Self {
        self.own = self.own.argument(name, argument);
        self
    }

    #[must_use]
    pub fn meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Register a clean hook under its method name, e.g. `clean_title`.
    #[must_use]
    pub fn clean(mut self, method: impl Into<String>, hook: CleanHook) -> Self {
        self.own = self.own.clean(method, hook);
        self
    }

    /// Register a render hook under its method name, e.g. `render_title`.
    #[must_use]
    pub fn render(mut self, method: impl Into<String>, hook: RenderHook) -> Self {
        self.own = self.own.render(method, hook);
        self
    }

    #[must_use]
    pub fn on_data(mut self, id: Option<&str>, callback: DataCallback) -> Self {
        self.own = self.own.on_data(id, callback);
        self
    }

    #[must_use]
    pub fn on_rendered(mut self, id: Option<&str>, callback: RenderedCallback) -> Self {
        self.own = self.own.on_rendered(id, callback);
        self
    }

    /// Replace the default body renderer.
    #[must_use]
    pub fn render_body(mut self, body: BodyRenderer) -> Self {
        self.body = Some(body);
        self
    }

    pub fn build(self, env: &Environment) -> Result<Arc<TagSchema>, TagError> {
        let mut arguments: IndexMap<String, Argument> = IndexMap::new();
        let mut hooks = HookTable::default();
        let mut callbacks = Callbacks::default();

        if let Some(base) = &self.base {
            arguments.extend(
                base.arguments
                    .iter()
                    .map(|(name, argument)| (name.clone(), argument.clone())),
            );
            hooks.extend(&base.hooks);
            callbacks.extend(&base.callbacks);
        }
        for fragment in self.fragments.iter().chain(std::iter::once(&self.own)) {
            arguments.extend(fragment.sorted_arguments());
            hooks.extend(&fragment.hooks);
            callbacks.extend(&fragment.callbacks);
        }

        // Inherited and mixed-in hooks may be orphaned by a redeclaration.
        if env.strict() {
            verify_hooks(&self.class_name, &arguments, &self.own.hooks)?;
        }

        for argument in arguments.values_mut() {
            argument.set_hooks(hooks.resolve(argument));
            tracing::trace!(
                "{}: contributed argument '{}' ({}, {})",
                self.class_name,
                argument.name(),
                argument.clean_method_name(),
                argument.render_method_name()
            );
        }

        let meta = self
            .meta
            .or_else(|| self.base.as_ref().map(|base| base.meta.clone()))
            .unwrap_or_default();
        let options = TagOptions::derive(&meta, &self.class_name);
        let body = self
            .body
            .or_else(|| self.base.as_ref().and_then(|base| base.body.clone()));

        tracing::debug!(
            "built tag schema '{}' as '{}' with arguments {:?}",
            self.class_name,
            options.start_tag(),
            arguments.keys().collect::<Vec<_>>()
        );

        Ok(Arc::new(TagSchema {
            class_name: self.class_name,
            meta,
            options,
            arguments,
            hooks,
            callbacks,
            body,
            compiled: Mutex::new(None),
        }))
    }
}

/// Every hook declared on the schema itself must belong to an argument.
fn verify_hooks(
    class_name: &str,
    arguments: &IndexMap<String, Argument>,
    hooks: &HookTable,
) -> Result<(), TagError> {
    let expected_clean: Vec<String> = arguments.values().map(Argument::clean_method_name).collect();
    let expected_render: Vec<String> =
        arguments.values().map(Argument::render_method_name).collect();

    let mut unknown: Vec<&str> = hooks
        .clean_names()
        .filter(|name| !expected_clean.iter().any(|e| e == name))
        .chain(
            hooks
                .render_names()
                .filter(|name| !expected_render.iter().any(|e| e == name)),
        )
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    unknown.sort_unstable();

    Err(TagError::Configuration(format!(
        "{class_name}: hooks {unknown:?} match no argument, expected one of {:?}",
        expected_clean
            .iter()
            .chain(&expected_render)
            .collect::<Vec<_>>()
    )))
}

fn take_binding(bits: &mut Vec<String>) -> Option<String> {
    let len = bits.len();
    if len >= 2 && bits[len - 2] == "as" {
        let name = bits.pop();
        bits.pop();
        name
    } else {
        None
    }
}

fn split_kwarg(bit: &str) -> Option<(&str, &str)> {
    let (key, value) = bit.split_once('=')?;
    let is_word = !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_');
    (is_word && !value.is_empty()).then_some((key, value))
}

/// Split tag bits into positional and keyword filter expressions.
fn parse_bits(
    parser: &Parser,
    bits: &[String],
    tag: &str,
) -> Result<(PositionalPool, KeywordPool), TagError> {
    let mut positionals = PositionalPool::new();
    let mut keywords = KeywordPool::new();

    for bit in bits {
        if let Some((key, value)) = split_kwarg(bit) {
            if keywords.contains_key(key) {
                return Err(TagError::Syntax(format!(
                    "'{tag}' received multiple values for keyword argument '{key}'"
                )));
            }
            keywords.insert(key.to_string(), parser.compile_filter(value)?);
        } else if keywords.is_empty() {
            positionals.push_back(parser.compile_filter(bit)?);
        } else {
            return Err(TagError::Syntax(format!(
                "'{tag}' received some positional argument(s) after some keyword argument(s)"
            )));
        }
    }

    Ok((positionals, keywords))
}

#[cfg(test)]
mod tests {
    use wraptag_conf::Settings;
    use wraptag_templates::Engine;
    use wraptag_templates::Lexer;
    use wraptag_templates::Value;

    use super::*;
    use crate::error::HookError;

    fn names(schema: &TagSchema) -> Vec<&str> {
        schema.arguments().keys().map(String::as_str).collect()
    }

    fn parser(source: &str, strict: bool) -> (Parser, Token) {
        let engine = Engine::builder(Settings::default().with_debug(strict)).build();
        let mut tokens = Lexer::new(source).tokenize();
        let first = tokens.remove(0);
        (Parser::new(tokens, engine), first)
    }

    mod registry {
        use super::*;

        #[test]
        fn test_declaration_order_with_base() {
            let env = Environment::default();
            let base = TagSchema::builder("Base")
                .argument("a", Argument::keyword())
                .argument("b", Argument::keyword())
                .argument("c", Argument::keyword())
                .build(&env)
                .unwrap();
            let child = TagSchema::builder("Child")
                .extends(&base)
                .argument("d", Argument::keyword())
                .argument("e", Argument::keyword())
                .build(&env)
                .unwrap();
            assert_eq!(names(&child), vec!["a", "b", "c", "d", "e"]);
        }

        #[test]
        fn test_redeclared_argument_keeps_position() {
            let env = Environment::default();
            let base = TagSchema::builder("Base")
                .argument("a", Argument::keyword())
                .argument("b", Argument::keyword().default("base"))
                .argument("c", Argument::keyword())
                .build(&env)
                .unwrap();
            let child = TagSchema::builder("Child")
                .extends(&base)
                .argument("d", Argument::keyword())
                .argument("b", Argument::keyword().default("child"))
                .argument("e", Argument::keyword())
                .build(&env)
                .unwrap();
            assert_eq!(names(&child), vec!["a", "b", "c", "d", "e"]);
            assert_eq!(child.arguments()["b"].get_default(), Value::from("child"));
            assert_eq!(base.arguments()["b"].get_default(), Value::from("base"));
        }

        #[test]
        fn test_own_arguments_sorted_by_creation() {
            let env = Environment::default();
            let first = Argument::keyword();
            let second = Argument::keyword();
            let schema = TagSchema::builder("Card")
                .argument("second", second)
                .argument("first", first)
                .build(&env)
                .unwrap();
            assert_eq!(names(&schema), vec!["first", "second"]);
        }

        #[test]
        fn test_fragments_merge_between_base_and_own() {
            let env = Environment::default();
            let base = TagSchema::builder("Base")
                .argument("a", Argument::keyword())
                .build(&env)
                .unwrap();
            let fragment = Fragment::new("Extra")
                .argument("x", Argument::keyword())
                .argument("a", Argument::keyword().default("fragment"));
            let schema = TagSchema::builder("Card")
                .extends(&base)
                .mixin(fragment)
                .argument("z", Argument::keyword())
                .build(&env)
                .unwrap();
            assert_eq!(names(&schema), vec!["a", "x", "z"]);
            assert_eq!(schema.arguments()["a"].get_default(), Value::from("fragment"));
        }

        #[test]
        fn test_meta_inherited_from_nearest_base() {
            let env = Environment::default();
            let base = TagSchema::builder("Base")
                .meta(Meta {
                    template: Some("base".to_string()),
                    ..Meta::default()
                })
                .build(&env)
                .unwrap();
            let child = TagSchema::builder("PanelTag").extends(&base).build(&env).unwrap();
            assert_eq!(child.meta().template.as_deref(), Some("base"));
            assert_eq!(child.options().start_tag(), "panel");
        }

        #[test]
        fn test_hooks_are_inherited_and_overridden() {
            let env = Environment::new(true);
            let base = TagSchema::builder("Base")
                .argument("title", Argument::keyword())
                .clean(
                    "clean_title",
                    Arc::new(|_: &Argument, _: Value| Ok(Value::from("base"))),
                )
                .build(&env)
                .unwrap();
            assert_eq!(
                base.arguments()["title"].full_clean(Value::from("x")),
                Value::from("base")
            );

            let child = TagSchema::builder("Child")
                .extends(&base)
                .clean(
                    "clean_title",
                    Arc::new(|_: &Argument, value: Value| Ok(Value::Str(format!("child {value}")))),
                )
                .build(&env)
                .unwrap();
            assert_eq!(
                child.arguments()["title"].full_clean(Value::from("x")),
                Value::from("child x")
            );
            assert_eq!(
                base.arguments()["title"].full_clean(Value::from("x")),
                Value::from("base")
            );
        }

        #[test]
        fn test_strict_rejects_misnamed_hooks() {
            let build = |env: &Environment| {
                TagSchema::builder("Card")
                    .argument("title", Argument::keyword())
                    .render(
                        "render_titel",
                        Arc::new(|_: &Argument, _: &Map, _: &Context| Err(HookError::NotImplemented)),
                    )
                    .build(env)
            };
            let err = build(&Environment::new(true)).unwrap_err();
            assert!(
                matches!(&err, TagError::Configuration(msg) if msg.contains("render_titel") && msg.contains("render_title")),
                "{err}"
            );
            assert!(build(&Environment::new(false)).is_ok());
        }

        #[test]
        fn test_strict_allows_inherited_hook_orphaned_by_redeclaration() {
            let env = Environment::new(true);
            let base = TagSchema::builder("Base")
                .argument("title", Argument::keyword())
                .clean(
                    "clean_title",
                    Arc::new(|_: &Argument, _: Value| Ok(Value::from("base"))),
                )
                .build(&env)
                .unwrap();

            let child = TagSchema::builder("Child")
                .extends(&base)
                .argument("title", Argument::keyword().clean_method("clean_heading"))
                .clean(
                    "clean_heading",
                    Arc::new(|_: &Argument, value: Value| Ok(Value::Str(format!("h {value}")))),
                )
                .build(&env)
                .unwrap();
            assert_eq!(
                child.arguments()["title"].full_clean(Value::from("x")),
                Value::from("h x")
            );

            let err = TagSchema::builder("Broken")
                .extends(&base)
                .clean(
                    "clean_titel",
                    Arc::new(|_: &Argument, value: Value| Ok(value)),
                )
                .build(&env)
                .unwrap_err();
            assert!(
                matches!(&err, TagError::Configuration(msg) if msg.contains("clean_titel")),
                "{err}"
            );
        }
    }

    mod compile {
        use super::*;

        fn schema(strict: bool) -> Arc<TagSchema> {
            TagSchema::builder("Card")
                .argument("first", Argument::positional())
                .argument("title", Argument::keyword())
                .build(&Environment::new(strict))
                .unwrap()
        }

        #[test]
        fn test_compile_claims_bits() {
            let (mut parser, token) =
                super::parser("{% card 1 title=\"Hi\" %}body{% end:card %}tail", false);
            let node = schema(false).compile(&mut parser, &token).unwrap();
            assert_eq!(node.varname(), None);
            assert_eq!(node.nodelist().len(), 1);
            assert_eq!(node.claims().len(), 2);
            assert_eq!(parser.parse(&[]).unwrap().len(), 1);
        }

        #[test]
        fn test_binding_on_either_tag() {
            let (mut parser, token) = super::parser("{% card 1 as res %}{% end:card %}", false);
            let node = schema(false).compile(&mut parser, &token).unwrap();
            assert_eq!(node.varname(), Some("res"));

            let (mut parser, token) = super::parser("{% card 1 %}{% end:card as res %}", false);
            let node = schema(false).compile(&mut parser, &token).unwrap();
            assert_eq!(node.varname(), Some("res"));

            let (mut parser, token) = super::parser("{% card 1 as a %}{% end:card as b %}", false);
            assert!(matches!(
                schema(false).compile(&mut parser, &token),
                Err(TagError::Syntax(_))
            ));
        }

        #[test]
        fn test_missing_positional() {
            let (mut parser, token) = super::parser("{% card %}{% end:card %}", false);
            assert!(matches!(
                schema(false).compile(&mut parser, &token),
                Err(TagError::Syntax(_))
            ));
        }

        #[test]
        fn test_bit_errors() {
            let cases = [
                "{% card 1 title=\"a\" title=\"b\" %}{% end:card %}",
                "{% card title=\"a\" 1 %}{% end:card %}",
                "{% card 1 title=_bad %}{% end:card %}",
                "{% card 1 %}",
            ];
            for source in cases {
                let (mut parser, token) = super::parser(source, false);
                let result = schema(false).compile(&mut parser, &token);
                assert!(
                    matches!(
                        result,
                        Err(TagError::Syntax(_) | TagError::Template(_))
                    ),
                    "{source}"
                );
            }
        }

        #[test]
        fn test_leftovers_strict_and_relaxed() {
            let source = "{% card 1 2 other=3 %}{% end:card %}";
            let (mut parser, token) = super::parser(source, false);
            assert!(schema(false).compile(&mut parser, &token).is_ok());

            let (mut parser, token) = super::parser(source, true);
            let err = schema(true).compile(&mut parser, &token).unwrap_err();
            assert!(matches!(err, TagError::Syntax(msg) if msg.contains("unhandled args")));

            let (mut parser, token) = super::parser("{% card 1 other=3 %}{% end:card %}", true);
            let err = schema(true).compile(&mut parser, &token).unwrap_err();
            assert!(matches!(err, TagError::Syntax(msg) if msg.contains("other")));
        }

        #[test]
        fn test_as_var_only() {
            let schema = TagSchema::builder("Modal")
                .meta(Meta {
                    as_var_only: true,
                    ..Meta::default()
                })
                .build(&Environment::default())
                .unwrap();

            let (mut parser, token) = super::parser("{% modal %}{% end:modal %}", true);
            assert!(matches!(
                schema.compile(&mut parser, &token),
                Err(TagError::Configuration(_))
            ));

            let (mut parser, token) = super::parser("{% modal as m %}{% end:modal %}", true);
            assert!(schema.compile(&mut parser, &token).is_ok());

            let (mut parser, token) = super::parser("{% modal %}{% end:modal %}", false);
            assert!(schema.compile(&mut parser, &token).is_ok());
        }
    }

    #[test]
    fn test_split_kwarg() {
        assert_eq!(split_kwarg("title=\"a=b\""), Some(("title", "\"a=b\"")));
        assert_eq!(split_kwarg("\"a=b\""), None);
        assert_eq!(split_kwarg("x"), None);
        assert_eq!(split_kwarg("x="), None);
        assert_eq!(split_kwarg("=x"), None);
    }
}
