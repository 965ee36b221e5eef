//! Cache key construction.
//!
//! Cache keys must be deterministic for identical logical requests: two
//! callers building a key from the same parameters in a different order must
//! end up with the same key, or the cache fragments silently. [`CacheKey`]
//! enforces this by sorting parameter names lexicographically before the key
//! is rendered.
//!
//! ## Format
//!
//! When rendered to a string, keys follow this format:
//! `{prefix}` or `{prefix}:name1:JSON(value1)|name2:JSON(value2)|...`
//!
//! Parameter values are encoded as compact JSON, so `"42"` (a string) and
//! `42` (a number) produce distinct keys.
//!
//! ```
//! use gatebox_core::CacheKey;
//!
//! // A bare prefix is a valid key.
//! let key = CacheKey::new("dashboard");
//! assert_eq!(key.to_string(), "dashboard");
//!
//! // Parameters are sorted by name, so insertion order never matters.
//! let a = CacheKey::builder("tickets")
//!     .param("status", &"open").unwrap()
//!     .param("org", &42).unwrap()
//!     .build();
//! let b = CacheKey::builder("tickets")
//!     .param("org", &42).unwrap()
//!     .param("status", &"open").unwrap()
//!     .build();
//! assert_eq!(a, b);
//! assert_eq!(a.to_string(), r#"tickets:org:42|status:"open""#);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A single named parameter of a cache key, with its value already rendered
/// as compact JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct KeyParam {
    name: SmolStr,
    value: String,
}

/// A cache key identifying a cached entry.
///
/// Composed of a `prefix` naming the logical dataset (e.g. `"tickets"`,
/// `"dashboard"`) and zero or more named parameters distinguishing concrete
/// requests within it. Parameters are kept sorted by name, so equality and
/// hashing are insertion-order independent.
///
/// Short prefixes and parameter names are stored inline via [`SmolStr`]
/// without heap allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    prefix: SmolStr,
    params: Vec<KeyParam>,
}

impl CacheKey {
    /// Creates a parameterless key from a prefix alone.
    pub fn new(prefix: impl Into<SmolStr>) -> Self {
        CacheKey {
            prefix: prefix.into(),
            params: Vec::new(),
        }
    }

    /// Starts building a parameterized key.
    pub fn builder(prefix: impl Into<SmolStr>) -> CacheKeyBuilder {
        CacheKeyBuilder {
            prefix: prefix.into(),
            params: Vec::new(),
        }
    }

    /// Returns the dataset prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the parameters as `(name, json_value)` pairs in sorted order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix)?;
        for (i, param) in self.params.iter().enumerate() {
            write!(f, "{}", if i == 0 { ':' } else { '|' })?;
            write!(f, "{}:{}", param.name, param.value)?;
        }
        Ok(())
    }
}

impl From<&str> for CacheKey {
    fn from(prefix: &str) -> Self {
        CacheKey::new(prefix)
    }
}

/// Builder accumulating named parameters for a [`CacheKey`].
///
/// Use [`CacheKey::builder`] to create one. Parameters may be added in any
/// order; [`build`](CacheKeyBuilder::build) sorts them by name.
#[derive(Debug)]
pub struct CacheKeyBuilder {
    prefix: SmolStr,
    params: Vec<KeyParam>,
}

impl CacheKeyBuilder {
    /// Adds a named parameter, encoding the value as compact JSON.
    ///
    /// Fails only if the value's [`Serialize`] implementation fails.
    pub fn param<T: Serialize>(
        mut self,
        name: impl Into<SmolStr>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        self.params.push(KeyParam {
            name: name.into(),
            value: serde_json::to_string(value)?,
        });
        Ok(self)
    }

    /// Finalizes the key, sorting parameters by name.
    pub fn build(mut self) -> CacheKey {
        self.params.sort_by(|a, b| a.name.cmp(&b.name));
        CacheKey {
            prefix: self.prefix,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_prefix_renders_without_separator() {
        let key = CacheKey::new("configuracoes");
        assert_eq!(key.to_string(), "configuracoes");
    }

    #[test]
    fn params_render_sorted_and_json_encoded() {
        let key = CacheKey::builder("relatorios")
            .param("to", &"2026-02-01")
            .unwrap()
            .param("from", &"2026-01-01")
            .unwrap()
            .param("page", &3)
            .unwrap()
            .build();
        assert_eq!(
            key.to_string(),
            r#"relatorios:from:"2026-01-01"|page:3|to:"2026-02-01""#
        );
    }

    #[test]
    fn insertion_order_does_not_change_the_key() {
        let a = CacheKey::builder("k")
            .param("b", &2)
            .unwrap()
            .param("a", &1)
            .unwrap()
            .build();
        let b = CacheKey::builder("k")
            .param("a", &1)
            .unwrap()
            .param("b", &2)
            .unwrap()
            .build();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn value_type_is_part_of_the_key() {
        let string = CacheKey::builder("k").param("id", &"42").unwrap().build();
        let number = CacheKey::builder("k").param("id", &42).unwrap().build();
        assert_ne!(string, number);
    }
}
