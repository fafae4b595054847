use super::{Formattable, FormatterRegistry, format_xml};
use crate::domain::LogKind;

pub const NOTHING: &str = "log nothing";
pub const NULL: &str = "null";

/// Renders the values of one logging call into a record body.
///
/// A single value is rendered according to `kind`; several values become one
/// `args[i] = ...` line each.
pub fn render_body(
    kind: LogKind,
    values: &[&dyn Formattable],
    registry: &FormatterRegistry,
) -> String {
    match values {
        [] => NOTHING.to_string(),
        [single] => {
            let rendered = render_single(kind, *single, registry);
            if rendered.is_empty() {
                NOTHING.to_string()
            } else {
                rendered
            }
        }
        many => {
            let mut body = String::new();
            for (index, value) in many.iter().enumerate() {
                body.push_str("args[");
                body.push_str(&index.to_string());
                body.push_str("] = ");
                body.push_str(&registry.format(*value));
                body.push('\n');
            }
            body
        }
    }
}

fn render_single(kind: LogKind, value: &dyn Formattable, registry: &FormatterRegistry) -> String {
    match kind {
        LogKind::Json => value.render_json(),
        LogKind::Xml => format_xml(&value.render()),
        LogKind::Standard | LogKind::FileOnly => registry.format(value),
    }
}
