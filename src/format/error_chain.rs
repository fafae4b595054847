use super::Formattable;
use std::any::Any;
use std::error::Error;

const MAX_CAUSES: usize = 32;

/// An error and its `source()` chain, captured as text.
///
/// ```text
/// connection refused
///  Caused by: timed out
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorChain {
    rendered: String,
}

impl ErrorChain {
    pub fn new(error: &(dyn Error + 'static)) -> Self {
        let mut rendered = error.to_string();
        let mut source = error.source();
        let mut depth = 0;

        while let Some(cause) = source {
            if depth == MAX_CAUSES {
                rendered.push_str("\n ...");
                break;
            }
            rendered.push_str("\n Caused by: ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
            depth += 1;
        }

        Self { rendered }
    }
}

impl<E: Error + 'static> From<&E> for ErrorChain {
    fn from(error: &E) -> Self {
        Self::new(error)
    }
}

impl Formattable for ErrorChain {
    fn render(&self) -> String {
        self.rendered.clone()
    }

    fn render_json(&self) -> String {
        self.render()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
