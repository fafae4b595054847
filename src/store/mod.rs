//! Small key-value persistence.
//!
//! `KvStore` is object safe, so hosts can swap the backing store behind an
//! `Arc<dyn KvStore>`.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Key must not be empty")]
    EmptyKey,
    #[error("Unsupported value for key '{0}'")]
    Unsupported(String),
    #[error("Store file {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum KvValue {
    Str(String),
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl KvValue {
    fn is_supported(&self) -> bool {
        match self {
            KvValue::Float(v) => v.is_finite(),
            KvValue::Double(v) => v.is_finite(),
            _ => true,
        }
    }
}

macro_rules! kv_conversions {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for KvValue {
                fn from(value: $ty) -> Self {
                    KvValue::$variant(value)
                }
            }

            impl TryFrom<KvValue> for $ty {
                type Error = KvValue;

                fn try_from(value: KvValue) -> Result<Self, Self::Error> {
                    match value {
                        KvValue::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

kv_conversions!(Str(String), Bool(bool), Int(i32), Long(i64), Float(f32), Double(f64));

impl From<&str> for KvValue {
    fn from(value: &str) -> Self {
        KvValue::Str(value.to_string())
    }
}

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<KvValue>;

    /// Stores `value`. Empty keys and non-finite floats are rejected.
    fn put(&self, key: &str, value: KvValue) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<Option<KvValue>, StoreError>;

    fn clear(&self) -> Result<(), StoreError>;

    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn keys(&self) -> Vec<String>;
}

/// Typed read with a fallback for missing keys and type mismatches.
pub fn get_or<T>(store: &dyn KvStore, key: &str, default: T) -> T
where
    T: TryFrom<KvValue>,
{
    store
        .get(key)
        .and_then(|value| T::try_from(value).ok())
        .unwrap_or(default)
}

/// `put` for optional values: `None` is rejected instead of stored.
pub fn put_opt<V: Into<KvValue>>(store: &dyn KvStore, key: &str, value: Option<V>) -> Result<(), StoreError> {
    match value {
        Some(value) => store.put(key, value.into()),
        None => Err(StoreError::Unsupported(key.to_string())),
    }
}

fn check_entry(key: &str, value: &KvValue) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::EmptyKey);
    }
    if !value.is_supported() {
        return Err(StoreError::Unsupported(key.to_string()));
    }
    Ok(())
}
