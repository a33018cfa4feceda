//! The value tree produced by parsing.
//!
//! A successful parse always yields an [`ConfigValue::Object`] root. Every
//! container owns its children outright; the accessors here hand out plain
//! borrows into the tree and never modify it.

use std::collections::HashMap;

use crate::path::{Path, PathSegment};

/// A node in a parsed configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ConfigValue {
    /// Returned in place of a tree when the input ended mid-statement.
    /// Never appears inside a successfully parsed tree.
    None,
    Int(i64),
    Float(f64),
    String(String),
    /// Named members. A later statement with the same name replaces the earlier one.
    Object(HashMap<String, ConfigValue>),
    Array(Vec<ConfigValue>),
}

impl ConfigValue {
    pub fn is_none(&self) -> bool {
        matches!(self, ConfigValue::None)
    }

    /// Short lowercase name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::None => "none",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Object(_) => "object",
            ConfigValue::Array(_) => "array",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Member `key` of an object. Absent for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_object()?.get(key)
    }

    /// Element `index` of an array. Absent when out of range or not an array.
    pub fn index(&self, index: usize) -> Option<&ConfigValue> {
        self.as_array()?.get(index)
    }

    /// Walk `keys` through nested objects starting at `self`.
    ///
    /// An empty key list resolves to `self`.
    pub fn resolve<K: AsRef<str>>(&self, keys: &[K]) -> Option<&ConfigValue> {
        keys.iter()
            .try_fold(self, |node, key| node.get(key.as_ref()))
    }

    /// Walk `keys` like [`ConfigValue::resolve`], then take element `index`
    /// of the array found there.
    pub fn resolve_array<K: AsRef<str>>(&self, index: usize, keys: &[K]) -> Option<&ConfigValue> {
        self.resolve(keys)?.index(index)
    }

    /// Follow a parsed [`Path`], keys through objects and indices through arrays.
    pub fn lookup(&self, path: &Path) -> Option<&ConfigValue> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| match segment {
                PathSegment::Key(key) => node.get(key),
                PathSegment::Index(i) => node.index(*i),
            })
    }
}

/// Resolve `keys` from `root`. See [`ConfigValue::resolve`].
pub fn resolve<'a, K: AsRef<str>>(root: &'a ConfigValue, keys: &[K]) -> Option<&'a ConfigValue> {
    root.resolve(keys)
}

/// Resolve `keys` from `root`, then index the array there.
/// See [`ConfigValue::resolve_array`].
pub fn resolve_array<'a, K: AsRef<str>>(
    root: &'a ConfigValue,
    index: usize,
    keys: &[K],
) -> Option<&'a ConfigValue> {
    root.resolve_array(index, keys)
}
