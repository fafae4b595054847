//! Turning arbitrary values into log text.
//!
//! Values enter the facility as `&dyn Formattable`. Plain rendering goes
//! through the `FormatterRegistry` first so hosts can override the text of
//! any concrete type; JSON and XML records use the pretty printers.

mod body;
mod error_chain;
mod json;
mod registry;
mod xml;

pub use body::{NOTHING, NULL, render_body};
pub use error_chain::ErrorChain;
pub use json::format_json;
pub use registry::FormatterRegistry;
pub use xml::format_xml;

use crate::codec::JsonCodec;
use serde::Serialize;
use std::any::Any;
use std::fmt::Debug;
use std::path::PathBuf;

/// A value that can be written into a log record.
pub trait Formattable: Any {
    /// Plain text form of the value.
    fn render(&self) -> String;

    /// Text used by JSON records. Defaults to pretty-printing the plain
    /// rendering when it looks like a JSON document.
    fn render_json(&self) -> String {
        format_json(&self.render())
    }

    /// Plain text with `registry` applied to nested values. Containers
    /// override this; everything else renders itself.
    fn render_with(&self, _registry: &FormatterRegistry) -> String {
        self.render()
    }

    fn as_any(&self) -> &dyn Any;
}

macro_rules! display_formattable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Formattable for $ty {
                fn render(&self) -> String {
                    self.to_string()
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

display_formattable!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    String, &'static str,
);

impl Formattable for PathBuf {
    fn render(&self) -> String {
        self.display().to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Formattable for serde_json::Value {
    fn render(&self) -> String {
        self.to_string()
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Formattable> Formattable for Option<T> {
    fn render(&self) -> String {
        match self {
            Some(value) => value.render(),
            None => NULL.to_string(),
        }
    }

    fn render_json(&self) -> String {
        match self {
            Some(value) => value.render_json(),
            None => NULL.to_string(),
        }
    }

    fn render_with(&self, registry: &FormatterRegistry) -> String {
        match self {
            Some(value) => registry.format(value),
            None => NULL.to_string(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Formattable> Formattable for Vec<T> {
    fn render(&self) -> String {
        render_sequence(self, None)
    }

    fn render_with(&self, registry: &FormatterRegistry) -> String {
        render_sequence(self, Some(registry))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Formattable, const N: usize> Formattable for [T; N] {
    fn render(&self) -> String {
        render_sequence(self, None)
    }

    fn render_with(&self, registry: &FormatterRegistry) -> String {
        render_sequence(self, Some(registry))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn render_sequence<T: Formattable>(items: &[T], registry: Option<&FormatterRegistry>) -> String {
    let inner: Vec<String> = items
        .iter()
        .map(|item| match registry {
            Some(registry) => registry.format(item),
            None => item.render(),
        })
        .collect();
    format!("[{}]", inner.join(", "))
}

/// Structured value rendered through serde.
///
/// Serialization failures fall back to the `Debug` form.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T: Serialize + Debug + 'static> Formattable for Json<T> {
    fn render(&self) -> String {
        self.encode(JsonCodec::COMPACT)
    }

    fn render_json(&self) -> String {
        self.encode(JsonCodec::PRETTY)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Serialize + Debug> Json<T> {
    fn encode(&self, codec: JsonCodec) -> String {
        codec.serialize(&self.0).unwrap_or_else(|e| {
            tracing::debug!("Falling back to Debug rendering: {}", e);
            format!("{:?}", self.0)
        })
    }
}

/// Any `Debug` value, rendered with `{:?}`.
#[derive(Debug, Clone)]
pub struct Dbg<T>(pub T);

impl<T: Debug + 'static> Formattable for Dbg<T> {
    fn render(&self) -> String {
        format!("{:?}", self.0)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builds the `&[&dyn Formattable]` argument slice of the logging calls.
///
/// ```
/// use rask_logkit::{values, Formattable};
///
/// let args: &[&dyn Formattable] = values!["user", 42, vec![1, 2]];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! values {
    () => {
        &[] as &[&dyn $crate::Formattable]
    };
    ($($value:expr),+ $(,)?) => {
        &[$(&$value as &dyn $crate::Formattable),+]
    };
}
