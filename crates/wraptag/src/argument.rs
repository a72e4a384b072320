use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use wraptag_templates::Context;
use wraptag_templates::FilterExpression;
use wraptag_templates::Map;
use wraptag_templates::Value;

use crate::error::HookError;
use crate::error::TagError;
use crate::error::ValidationError;
use crate::globstr::GlobCache;
use crate::hooks::ArgumentHooks;

static CREATION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub type Validator = Arc<dyn Fn(&Value) -> Result<(), ValidationError> + Send + Sync>;

pub type ValueFactory = Arc<dyn Fn() -> Value + Send + Sync>;

pub type ChoicesFactory = Arc<dyn Fn() -> Vec<Value> + Send + Sync>;

/// Keyword bits of one tag occurrence that no argument has claimed yet.
pub type KeywordPool = IndexMap<String, FilterExpression>;

/// Positional bits of one tag occurrence that no argument has claimed yet.
pub type PositionalPool = VecDeque<FilterExpression>;

#[derive(Clone, Debug)]
pub enum ArgumentKind {
    Positional { varargs: bool },
    Keyword,
    KeywordGroup { globs: Vec<String> },
}

#[derive(Clone)]
enum DefaultValue {
    Value(Value),
    Factory(ValueFactory),
}

#[derive(Clone)]
enum Choices {
    Fixed(Vec<Value>),
    Factory(ChoicesFactory),
}

/// What an argument took from the tag bits at compile time.
#[derive(Clone, Debug, PartialEq)]
pub enum Claim {
    /// Nothing was given, the value is the argument's default.
    Default(Value),
    Expr(FilterExpression),
    Many(Vec<FilterExpression>),
    Group(IndexMap<String, FilterExpression>),
}

/// One declared piece of tag syntax.
///
/// Arguments are declared without a name; the schema they are contributed to
/// names them and resolves their hooks. Every tag occurrence works on its own
/// copy, and every default fetch materializes a new value, so nothing claimed
/// or defaulted in one render is visible in another.
#[derive(Clone)]
pub struct Argument {
    name: String,
    kind: ArgumentKind,
    patterns: Vec<Regex>,
    default: Option<DefaultValue>,
    choices: Option<Choices>,
    validators: Vec<Validator>,
    help_text: Option<String>,
    clean_method: Option<String>,
    render_method: Option<String>,
    readonly: bool,
    creation_counter: u64,
    hooks: ArgumentHooks,
}

impl Argument {
    fn with_kind(kind: ArgumentKind) -> Self {
        Self {
            name: String::new(),
            kind,
            patterns: Vec::new(),
            default: None,
            choices: None,
            validators: Vec::new(),
            help_text: None,
            clean_method: None,
            render_method: None,
            readonly: false,
            creation_counter: CREATION_COUNTER.fetch_add(1, Ordering::Relaxed),
            hooks: ArgumentHooks::default(),
        }
    }

    /// Takes the next positional bit.
    #[must_use]
    pub fn positional() -> Self {
        Self::with_kind(ArgumentKind::Positional { varargs: false })
    }

    /// Takes every remaining positional bit.
    #[must_use]
    pub fn varargs() -> Self {
        Self::with_kind(ArgumentKind::Positional { varargs: true })
    }

    /// Takes the keyword bit with the argument's name.
    #[must_use]
    pub fn keyword() -> Self {
        Self::with_kind(ArgumentKind::Keyword)
    }

    /// Takes every keyword bit whose name matches one of `globs`, see
    /// [`globstr`](crate::globstr).
    pub fn keyword_group<S: AsRef<str>>(cache: &GlobCache, globs: &[S]) -> Result<Self, TagError> {
        if globs.is_empty() {
            return Err(TagError::Syntax(
                "keyword group must have at least one pattern".to_string(),
            ));
        }
        let patterns = globs
            .iter()
            .map(|glob| {
                cache.get(glob.as_ref()).map_err(|err| {
                    TagError::Syntax(format!(
                        "invalid keyword group pattern '{}': {err}",
                        glob.as_ref()
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut argument = Self::with_kind(ArgumentKind::KeywordGroup {
            globs: globs.iter().map(|g| g.as_ref().to_string()).collect(),
        });
        argument.patterns = patterns;
        Ok(argument)
    }

    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Default computed on every fetch.
    #[must_use]
    pub fn default_with(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(DefaultValue::Factory(Arc::new(factory)));
        self
    }

    #[must_use]
    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = Some(Choices::Fixed(
            choices.into_iter().map(Into::into).collect(),
        ));
        self
    }

    #[must_use]
    pub fn choices_with(
        mut self,
        factory: impl Fn() -> Vec<Value> + Send + Sync + 'static,
    ) -> Self {
        self.choices = Some(Choices::Factory(Arc::new(factory)));
        self
    }

    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// Look the clean hook up under `name` instead of `clean_<name>`.
    #[must_use]
    pub fn clean_method(mut self, name: impl Into<String>) -> Self {
        self.clean_method = Some(name.into());
        self
    }

    /// Look the render hook up under `name` instead of `render_<name>`.
    #[must_use]
    pub fn render_method(mut self, name: impl Into<String>) -> Self {
        self.render_method = Some(name.into());
        self
    }

    /// A read-only argument never claims bits and always yields its default.
    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub(crate) fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub(crate) fn set_hooks(&mut self, hooks: ArgumentHooks) {
        self.hooks = hooks;
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &ArgumentKind {
        &self.kind
    }

    #[must_use]
    pub fn help(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    #[must_use]
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    #[must_use]
    pub fn creation_counter(&self) -> u64 {
        self.creation_counter
    }

    #[must_use]
    pub fn clean_method_name(&self) -> String {
        self.clean_method
            .clone()
            .unwrap_or_else(|| format!("clean_{}", self.name))
    }

    #[must_use]
    pub fn render_method_name(&self) -> String {
        self.render_method
            .clone()
            .unwrap_or_else(|| format!("render_{}", self.name))
    }

    /// Keyword that carries a raw value handed down from a parent tag.
    #[must_use]
    pub fn raw_key(&self) -> String {
        format!("__raw__{}", self.name)
    }

    /// A freshly materialized default value.
    #[must_use]
    pub fn get_default(&self) -> Value {
        match &self.default {
            Some(DefaultValue::Value(value)) => value.clone(),
            Some(DefaultValue::Factory(factory)) => factory(),
            None => match self.kind {
                ArgumentKind::Positional { varargs: true } => Value::List(Vec::new()),
                ArgumentKind::KeywordGroup { .. } => Value::Map(Map::new()),
                _ => Value::None,
            },
        }
    }

    #[must_use]
    pub fn get_choices(&self) -> Option<Vec<Value>> {
        match &self.choices {
            Some(Choices::Fixed(values)) => Some(values.clone()),
            Some(Choices::Factory(factory)) => Some(factory()),
            None => None,
        }
    }

    /// Whether `key` matches one of this keyword group's patterns.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(key))
    }

    /// Entries of `value` whose keys match this keyword group's patterns.
    #[must_use]
    pub fn filter_data(&self, value: &Map) -> Map {
        value
            .iter()
            .filter(|(key, _)| self.matches(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Remove this argument's share of the bits from the pools.
    pub fn claim(
        &self,
        positionals: &mut PositionalPool,
        keywords: &mut KeywordPool,
    ) -> Result<Claim, TagError> {
        if self.readonly {
            return Ok(Claim::Default(self.get_default()));
        }

        match &self.kind {
            ArgumentKind::Positional { varargs: true } => {
                Ok(Claim::Many(positionals.drain(..).collect()))
            }
            ArgumentKind::Positional { varargs: false } => {
                positionals.pop_front().map(Claim::Expr).ok_or_else(|| {
                    TagError::Syntax(format!(
                        "argument '{}' expected positional argument",
                        self.name
                    ))
                })
            }
            ArgumentKind::Keyword => {
                let value = keywords.shift_remove(&self.name);
                match keywords.shift_remove(&self.raw_key()) {
                    Some(raw) => Ok(Claim::Expr(raw)),
                    None => Ok(value.map_or_else(|| Claim::Default(self.get_default()), Claim::Expr)),
                }
            }
            ArgumentKind::KeywordGroup { .. } => {
                let keys: Vec<String> = keywords
                    .keys()
                    .filter(|key| self.matches(key))
                    .cloned()
                    .collect();
                let mut group = IndexMap::new();
                for key in keys {
                    if let Some(expression) = keywords.shift_remove(&key) {
                        group.insert(key, expression);
                    }
                }
                Ok(Claim::Group(group))
            }
        }
    }

    /// Evaluate a claim against `context`.
    ///
    /// Expressions that fail to resolve pass through as their source text.
    #[must_use]
    pub fn resolve(&self, context: &Context, claim: &Claim) -> Value {
        match claim {
            Claim::Default(_) => self.get_default(),
            Claim::Expr(expression) => match lenient(context, expression) {
                Value::None => self.get_default(),
                value => value,
            },
            Claim::Many(expressions) => Value::List(
                expressions
                    .iter()
                    .map(|expression| lenient(context, expression))
                    .collect(),
            ),
            Claim::Group(expressions) => {
                let mut value = self.get_default();
                if let Some(map) = value.as_map_mut() {
                    for (key, expression) in expressions {
                        map.insert(key.clone(), lenient(context, expression));
                    }
                }
                value
            }
        }
    }

    /// Choices, then validators, then the clean hook.
    ///
    /// Never fails: rejected values are replaced by the default.
    #[must_use]
    pub fn full_clean(&self, value: Value) -> Value {
        let mut value = self.check_choices(value);

        for validator in &self.validators {
            if let Err(err) = validator(&value) {
                tracing::debug!("argument '{}' failed validation: {}", self.name, err);
                value = self.get_default();
                break;
            }
        }

        match (self.hooks.clean)(self, value.clone()) {
            Ok(cleaned) => cleaned,
            Err(HookError::NotImplemented) => value,
            Err(HookError::Invalid(reason)) => {
                tracing::debug!("argument '{}' cleaned as invalid: {}", self.name, reason);
                self.get_default()
            }
            Err(HookError::Failed(err)) => {
                tracing::warn!(
                    "{} failed, keeping value: {:#}",
                    self.clean_method_name(),
                    err
                );
                value
            }
        }
    }

    fn check_choices(&self, value: Value) -> Value {
        let Some(choices) = self.get_choices() else {
            return value;
        };

        match (&self.kind, value) {
            (ArgumentKind::KeywordGroup { .. }, Value::Map(entries)) => {
                let default = self.get_default();
                let mut checked = Map::new();
                for (key, entry) in entries {
                    if choices.contains(&entry) {
                        checked.insert(key, entry);
                    } else if let Some(fallback) = default.get(&key) {
                        checked.insert(key, fallback);
                    }
                }
                Value::Map(checked)
            }
            (ArgumentKind::Positional { varargs: true }, Value::List(items)) => Value::List(
                items
                    .into_iter()
                    .filter(|item| choices.contains(item))
                    .collect(),
            ),
            (_, value) if choices.contains(&value) => value,
            (_, value) => {
                tracing::debug!(
                    "argument '{}': {} is not one of the choices",
                    self.name,
                    value
                );
                self.get_default()
            }
        }
    }

    /// Call the render hook with the complete argument data.
    ///
    /// `None`, blank values and unimplemented hooks contribute nothing.
    pub fn render(&self, context: &Context, data: &Map) -> Result<Option<Value>, TagError> {
        match (self.hooks.render)(self, data, context) {
            Ok(Some(value)) if !is_blank(&value) => Ok(Some(value)),
            Ok(_) | Err(HookError::NotImplemented) => Ok(None),
            Err(err) => Err(TagError::Render(format!(
                "{} failed: {err}",
                self.render_method_name()
            ))),
        }
    }

    /// Reference entry for generated documentation.
    #[must_use]
    pub fn doc(&self) -> String {
        let mut doc = format!("``{}``", self.name);
        if let Some(help) = &self.help_text {
            doc.push_str(&format!(" - {help}"));
        }
        if let ArgumentKind::KeywordGroup { globs } = &self.kind {
            let quoted: Vec<String> = globs.iter().map(|glob| format!("\"{glob}\"")).collect();
            doc.push_str(&format!("\n    * patterns - [{}]", quoted.join(", ")));
        }
        if let Some(choices) = self.get_choices() {
            doc.push_str(&format!("\n    * choices - {}", Value::List(choices)));
        }
        let default = self.get_default();
        if default.is_truthy() {
            doc.push_str(&format!("\n    * default - {default}"));
        }
        if self.readonly {
            doc.push_str("\n    * read-only");
        }
        doc
    }
}

fn lenient(context: &Context, expression: &FilterExpression) -> Value {
    expression.resolve(context).unwrap_or_else(|err| {
        tracing::trace!("'{}' left unresolved: {}", expression.token(), err);
        Value::Str(expression.token().to_string())
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::None => true,
        Value::Str(s) => s.is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        _ => false,
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("readonly", &self.readonly)
            .field("creation_counter", &self.creation_counter)
            .finish_non_exhaustive()
    }
}
