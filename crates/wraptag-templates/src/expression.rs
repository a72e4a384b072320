use std::fmt;

use crate::context::Context;
use crate::error::TemplateError;
use crate::filters::builtins;
use crate::filters::FilterFn;
use crate::quotes::find_unquoted;
use crate::quotes::split_unquoted;
use crate::quotes::unquote;
use crate::value::Value;

/// The base of a filter expression: a literal or a dotted variable path.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Literal(Value),
    Variable(Vec<String>),
}

impl Operand {
    fn parse(raw: &str) -> Result<Self, TemplateError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TemplateError::Syntax("Empty variable expression".to_string()));
        }
        if let Some(text) = unquote(raw) {
            return Ok(Operand::Literal(Value::Str(text)));
        }
        match raw {
            "True" => return Ok(Operand::Literal(Value::Bool(true))),
            "False" => return Ok(Operand::Literal(Value::Bool(false))),
            "None" => return Ok(Operand::Literal(Value::None)),
            _ => {}
        }
        if let Ok(int) = raw.parse::<i64>() {
            return Ok(Operand::Literal(Value::Int(int)));
        }
        if raw.contains('.') {
            if let Ok(float) = raw.parse::<f64>() {
                return Ok(Operand::Literal(Value::Float(float)));
            }
        }

        let valid = raw
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_'))
            && !raw.starts_with('_');
        if !valid {
            return Err(TemplateError::Syntax(format!(
                "Could not parse the remainder: '{raw}'"
            )));
        }
        Ok(Operand::Variable(raw.split('.').map(String::from).collect()))
    }

    fn resolve(&self, context: &Context) -> Result<Value, TemplateError> {
        match self {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Variable(path) => {
                let missing = || TemplateError::VariableDoesNotExist(path.join("."));
                let (first, rest) = path.split_first().ok_or_else(missing)?;
                let mut current = context.get(first).cloned().ok_or_else(missing)?;
                for step in rest {
                    current = current.get(step).ok_or_else(missing)?;
                }
                Ok(current)
            }
        }
    }
}

#[derive(Clone)]
struct FilterCall {
    name: String,
    func: FilterFn,
    arg: Option<Operand>,
}

impl fmt::Debug for FilterCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterCall")
            .field("name", &self.name)
            .field("arg", &self.arg)
            .finish_non_exhaustive()
    }
}

/// A compiled `value|filter:arg|filter` expression, as found in `{{ }}` and
/// in tag bits.
#[derive(Clone, Debug)]
pub struct FilterExpression {
    token: String,
    operand: Operand,
    filters: Vec<FilterCall>,
}

impl PartialEq for FilterExpression {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl FilterExpression {
    /// Compile `token`, looking filters up with `lookup`.
    pub fn parse(
        token: &str,
        lookup: impl Fn(&str) -> Option<FilterFn>,
    ) -> Result<Self, TemplateError> {
        let mut segments = split_unquoted(token, '|').into_iter();
        let operand = Operand::parse(segments.next().unwrap_or_default())?;

        let mut filters = Vec::new();
        for segment in segments {
            let segment = segment.trim();
            let (name, arg) = match find_unquoted(segment, ':') {
                Some(pos) => (
                    segment[..pos].trim(),
                    Some(Operand::parse(&segment[pos + 1..])?),
                ),
                None => (segment, None),
            };
            if name.is_empty() {
                return Err(TemplateError::Syntax(format!(
                    "Empty filter in expression: '{token}'"
                )));
            }
            let func = lookup(name)
                .ok_or_else(|| TemplateError::Syntax(format!("Invalid filter: '{name}'")))?;
            filters.push(FilterCall {
                name: name.to_string(),
                func,
                arg,
            });
        }

        Ok(Self {
            token: token.to_string(),
            operand,
            filters,
        })
    }

    /// Compile `token` against the built-in filters only.
    pub fn new(token: &str) -> Result<Self, TemplateError> {
        let filters = builtins();
        Self::parse(token, |name| filters.get(name).cloned())
    }

    /// Source text the expression was compiled from.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|f| f.name.as_str())
    }

    /// Evaluate against `context`.
    ///
    /// A missing variable is an error unless filters follow it, in which case
    /// the chain starts from `None` so `|default:` can recover.
    pub fn resolve(&self, context: &Context) -> Result<Value, TemplateError> {
        let mut value = match self.operand.resolve(context) {
            Ok(value) => value,
            Err(TemplateError::VariableDoesNotExist(_)) if !self.filters.is_empty() => Value::None,
            Err(err) => return Err(err),
        };
        for filter in &self.filters {
            let arg = filter
                .arg
                .as_ref()
                .map(|arg| arg.resolve(context))
                .transpose()?;
            value = (filter.func)(value, arg)?;
        }
        Ok(value)
    }
}
