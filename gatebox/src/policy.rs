//! Policy registries with the built-in tables.
//!
//! [`LimitClasses`] and [`CachePolicies`] are the named-policy tables the
//! services consult. Both ship defaults (see [`LimitClasses::default`] and
//! [`CachePolicies::default`]) and accept arbitrary additional entries, so
//! call sites never hard-code attempt counts or TTLs.

use std::collections::HashMap;

use chrono::TimeDelta;
use smol_str::SmolStr;

use gatebox_core::{CachePolicy, LimitClass};

/// Named rate-limit policy table.
///
/// # Defaults
///
/// | class  | max attempts | window | block  |
/// |--------|--------------|--------|--------|
/// | login  | 5            | 15 min | 30 min |
/// | api    | 100          | 1 min  | 5 min  |
/// | upload | 10           | 1 h    | 1 h    |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitClasses {
    classes: HashMap<SmolStr, LimitClass>,
}

impl LimitClasses {
    /// Creates an empty table with no classes registered.
    pub fn empty() -> Self {
        LimitClasses {
            classes: HashMap::new(),
        }
    }

    /// Registers (or replaces) a class.
    pub fn insert(&mut self, name: impl Into<SmolStr>, class: LimitClass) {
        self.classes.insert(name.into(), class);
    }

    /// Looks up a class by name.
    pub fn get(&self, name: &str) -> Option<&LimitClass> {
        self.classes.get(name)
    }

    /// Iterates over registered class names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(SmolStr::as_str)
    }
}

impl Default for LimitClasses {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(
            "login",
            LimitClass::new(5, TimeDelta::minutes(15), TimeDelta::minutes(30)),
        );
        table.insert(
            "api",
            LimitClass::new(100, TimeDelta::minutes(1), TimeDelta::minutes(5)),
        );
        table.insert(
            "upload",
            LimitClass::new(10, TimeDelta::hours(1), TimeDelta::hours(1)),
        );
        table
    }
}

/// Named per-dataset cache policy table.
///
/// Each default dataset is tagged with its own name, so invalidating the tag
/// `"tickets"` drops every entry stored under the `tickets` policy.
///
/// # Defaults
///
/// | dataset       | ttl    |
/// |---------------|--------|
/// | tickets       | 60 s   |
/// | clientes      | 300 s  |
/// | prestadores   | 300 s  |
/// | tabela_precos | 3600 s |
/// | configuracoes | 3600 s |
/// | dashboard     | 30 s   |
/// | relatorios    | 120 s  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicies {
    policies: HashMap<SmolStr, CachePolicy>,
}

impl CachePolicies {
    /// Creates an empty table with no datasets registered.
    pub fn empty() -> Self {
        CachePolicies {
            policies: HashMap::new(),
        }
    }

    /// Registers (or replaces) a dataset policy.
    pub fn insert(&mut self, name: impl Into<SmolStr>, policy: CachePolicy) {
        self.policies.insert(name.into(), policy);
    }

    /// Looks up a dataset policy by name.
    pub fn get(&self, name: &str) -> Option<&CachePolicy> {
        self.policies.get(name)
    }

    /// Iterates over registered dataset names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(SmolStr::as_str)
    }
}

impl Default for CachePolicies {
    fn default() -> Self {
        let mut table = Self::empty();
        for (name, ttl_secs) in [
            ("tickets", 60),
            ("clientes", 300),
            ("prestadores", 300),
            ("tabela_precos", 3600),
            ("configuracoes", 3600),
            ("dashboard", 30),
            ("relatorios", 120),
        ] {
            table.insert(
                name,
                CachePolicy::new(TimeDelta::seconds(ttl_secs), vec![SmolStr::new(name)]),
            );
        }
        table
    }
}
