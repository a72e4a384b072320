use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::TemplateError;
use crate::value::Value;

/// A template filter: receives the piped value and the optional `:arg`.
pub type FilterFn = Arc<dyn Fn(Value, Option<Value>) -> Result<Value, TemplateError> + Send + Sync>;

/// Filters available to every engine without loading a library.
#[must_use]
pub fn builtins() -> FxHashMap<String, FilterFn> {
    let mut filters: FxHashMap<String, FilterFn> = FxHashMap::default();
    filters.insert("default".to_string(), Arc::new(default));
    filters.insert("upper".to_string(), Arc::new(upper));
    filters.insert("lower".to_string(), Arc::new(lower));
    filters.insert("length".to_string(), Arc::new(length));
    filters.insert("join".to_string(), Arc::new(join));
    filters.insert("escape".to_string(), Arc::new(escape));
    filters
}

/// Replace the characters that are significant in HTML text and attribute
/// values with their entities.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[allow(clippy::unnecessary_wraps)]
fn default(value: Value, arg: Option<Value>) -> Result<Value, TemplateError> {
    if value.is_truthy() {
        Ok(value)
    } else {
        Ok(arg.unwrap_or_default())
    }
}

#[allow(clippy::unnecessary_wraps, clippy::needless_pass_by_value)]
fn upper(value: Value, _arg: Option<Value>) -> Result<Value, TemplateError> {
    Ok(Value::Str(value.to_string().to_uppercase()))
}

#[allow(clippy::unnecessary_wraps, clippy::needless_pass_by_value)]
fn lower(value: Value, _arg: Option<Value>) -> Result<Value, TemplateError> {
    Ok(Value::Str(value.to_string().to_lowercase()))
}

#[allow(clippy::needless_pass_by_value)]
fn length(value: Value, _arg: Option<Value>) -> Result<Value, TemplateError> {
    let len = match &value {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        _ => 0,
    };
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| TemplateError::Render("length does not fit in an integer".to_string()))
}

#[allow(clippy::unnecessary_wraps, clippy::needless_pass_by_value)]
fn escape(value: Value, _arg: Option<Value>) -> Result<Value, TemplateError> {
    Ok(Value::Str(escape_html(&value.to_string())))
}

#[allow(clippy::needless_pass_by_value)]
fn join(value: Value, arg: Option<Value>) -> Result<Value, TemplateError> {
    let separator = arg.map(|a| a.to_string()).unwrap_or_default();
    match value {
        Value::List(items) => Ok(Value::Str(
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(&separator),
        )),
        other => Ok(other),
    }
}
