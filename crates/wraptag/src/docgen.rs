//! Plain-text reference documentation for a tag schema.

use crate::argument::ArgumentKind;
use crate::schema::TagSchema;

const GROUPS: [&str; 3] = ["Arguments", "Keyword arguments", "Keyword arguments groups"];

fn group_index(kind: &ArgumentKind) -> usize {
    match kind {
        ArgumentKind::Positional { .. } => 0,
        ArgumentKind::Keyword => 1,
        ArgumentKind::KeywordGroup { .. } => 2,
    }
}

/// Reference for `schema`: usage line, then its arguments grouped by kind in
/// declaration order.
#[must_use]
pub fn generate(schema: &TagSchema) -> String {
    let options = schema.options();
    let start_tag = options.start_tag();

    let mut groups: [Vec<String>; 3] = Default::default();
    for argument in schema.arguments().values() {
        groups[group_index(argument.kind())].push(argument.doc());
    }

    let mut out = format!("{start_tag}\n{}\n\n", "=".repeat(start_tag.len()));
    out.push_str(&format!(
        "``{{% {start_tag} %}}...{{% {} %}}``\n",
        options.end_tag()
    ));
    for (title, docs) in GROUPS.iter().zip(&groups) {
        if docs.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{title}\n{}\n", "-".repeat(title.len())));
        for doc in docs {
            out.push('\n');
            out.push_str(doc);
            out.push('\n');
        }
    }
    out
}
