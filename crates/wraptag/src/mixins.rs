//! Fragments for common HTML attributes.
//!
//! Each fragment declares its arguments together with the render hooks that
//! turn them into attribute text, available in tag templates as
//! `<name>__rendered`.

use std::sync::Arc;

use wraptag_templates::filters::escape_html;
use wraptag_templates::Context;
use wraptag_templates::Map;
use wraptag_templates::Value;

use crate::argument::Argument;
use crate::environment::Environment;
use crate::error::HookError;
use crate::error::TagError;
use crate::schema::Fragment;
use crate::tag::generate_id;

fn attribute(
    name: &'static str,
) -> impl Fn(&Argument, &Map, &Context) -> Result<Option<Value>, HookError> + Send + Sync + 'static
{
    move |argument: &Argument, data: &Map, _: &Context| {
        Ok(data
            .get(argument.name())
            .filter(|value| value.is_truthy())
            .map(|value| {
                Value::Str(format!("{name}=\"{}\"", escape_html(&value.to_string())))
            }))
    }
}

/// `id` (generated when not given) and `name` attributes.
#[must_use]
pub fn identity() -> Fragment {
    Fragment::new("Identity")
        .argument("id", Argument::keyword().help_text("html id attribute"))
        .argument("name", Argument::keyword().help_text("html name attribute"))
        .clean(
            "clean_id",
            Arc::new(|_: &Argument, value: Value| {
                if value.is_truthy() {
                    Ok(value)
                } else {
                    Ok(Value::Str(generate_id()))
                }
            }),
        )
        .render("render_id", Arc::new(attribute("id")))
        .render("render_name", Arc::new(attribute("name")))
}

/// Extra CSS classes.
#[must_use]
pub fn css_class() -> Fragment {
    Fragment::new("CssClass").argument(
        "css_class",
        Argument::keyword()
            .default("")
            .help_text("Additional css class (e.g. ``\"class1 class2\"``)"),
    )
}

/// `data_*` keywords rendered as `data-*` attributes.
pub fn data_attributes(env: &Environment) -> Result<Fragment, TagError> {
    let group = Argument::keyword_group(env.globs(), &["data_<ident>"])?
        .help_text("data attributes, data_* will be converted to data-*");
    Ok(Fragment::new("Data").argument("data", group).render(
        "render_data",
        Arc::new(|argument: &Argument, data: &Map, _: &Context| {
            let Some(entries) = data.get(argument.name()).and_then(Value::as_map) else {
                return Ok(None);
            };
            let attributes: Vec<String> = entries
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{}=\"{}\"",
                        key.replace('_', "-"),
                        escape_html(&value.to_string())
                    )
                })
                .collect();
            Ok(Some(Value::Str(attributes.join(" "))))
        }),
    ))
}

/// Grid size keywords (`xs`, `sm`, `md`, `lg`) rendered as `col-<size>-<n>`.
pub fn size(env: &Environment) -> Result<Fragment, TagError> {
    let group = Argument::keyword_group(env.globs(), &["xs", "sm", "md", "lg"])?
        .help_text("column width per breakpoint");
    Ok(Fragment::new("Size").argument("size", group).render(
        "render_size",
        Arc::new(|argument: &Argument, data: &Map, _: &Context| {
            let Some(entries) = data.get(argument.name()).and_then(Value::as_map) else {
                return Ok(None);
            };
            let classes: Vec<String> = argument
                .filter_data(entries)
                .iter()
                .map(|(key, value)| format!("col-{key}-{value}"))
                .collect();
            Ok(Some(Value::Str(classes.join(" "))))
        }),
    ))
}
