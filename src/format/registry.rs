use super::Formattable;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type FormatFn = dyn Fn(&dyn Any) -> Option<String> + Send + Sync;

/// Per-type formatter overrides, keyed by `TypeId`.
///
/// Lookup is a single hash lookup on the value's concrete type; values
/// without a registered formatter use their own `render`. Elements of
/// `Option`, `Vec` and arrays are looked up one by one.
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    formatters: HashMap<TypeId, Arc<FormatFn>>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `formatter` for `T`, replacing any previous one.
    pub fn register<T, F>(&mut self, formatter: F)
    where
        T: 'static,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let erased = move |value: &dyn Any| value.downcast_ref::<T>().map(&formatter);
        self.formatters.insert(TypeId::of::<T>(), Arc::new(erased));
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.formatters.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    pub fn format(&self, value: &dyn Formattable) -> String {
        if !self.formatters.is_empty() {
            let any = value.as_any();
            if let Some(formatter) = self.formatters.get(&any.type_id())
                && let Some(text) = formatter(any)
            {
                return text;
            }
        }
        value.render_with(self)
    }
}
