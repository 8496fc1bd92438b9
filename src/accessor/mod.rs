/*
    beanio
    https://github.com/beanio-rs/beanio

    src/accessor/mod.rs

    Accessor resolution: Rust has no runtime reflection over arbitrary user
    types, so a bean type registers an explicit table of `(key,
    AccessorEntry)` pairs instead of being probed through compiler metadata.
    Candidate keys are tried in order:

      1. an explicit getter/setter name from configuration, tried literally
         and with conventional `get`/`is`/`set` prefixes stripped
      2. a registered key equal to `name`, `Capitalize(name)`,
         `Decapitalize(name)`, `_name`, `m_name`
      3. (no separate field tier — see module doc below)
      4. if a key was found but lacks the requested direction, the inverse
         prefix is tried against the same variant set
      5. failure is "neither property nor field found"

    Every bean in this crate is ultimately backed by a `Value::Object`'s
    `BTreeMap<String, Value>` (see `crate::value`), so there is no separate
    "field" storage distinct from "property" storage to probe as its own
    tier — registering a key under this table *is* exposing a map slot,
    which is why step 3 above collapses into step 2.
*/

use std::sync::Arc;

use dashmap::DashMap;

/// Gates whether a registered accessor participates in resolution when the
/// stream's `allow_protected_property_access` is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Restricted,
}

#[derive(Debug, Clone)]
struct AccessorEntry {
    key: String,
    getter: bool,
    setter: bool,
    visibility: Visibility,
}

/// Registration + resolution table for one bean's accessors. Keyed by
/// `BeanSpec::class_name` and shared through a `dashmap::DashMap` so
/// registration can happen lazily from any thread before first use.
#[derive(Clone)]
pub struct AccessorRegistry {
    beans: Arc<DashMap<String, Vec<AccessorEntry>>>,
}

impl AccessorRegistry {
    pub fn new() -> Self {
        AccessorRegistry {
            beans: Arc::new(DashMap::new()),
        }
    }

    /// Registers a property `key` for `class_name`. `getter`/`setter`
    /// indicate which directions this key supports — a read-only computed
    /// property registers `getter: true, setter: false`.
    pub fn register(
        &self,
        class_name: impl Into<String>,
        key: impl Into<String>,
        getter: bool,
        setter: bool,
        visibility: Visibility,
    ) {
        self.beans
            .entry(class_name.into())
            .or_default()
            .push(AccessorEntry {
                key: key.into(),
                getter,
                setter,
                visibility,
            });
    }

    /// Resolves the storage key to read `name` from on `class_name`, per
    /// the five-step order above.
    pub fn resolve_get(
        &self,
        class_name: &str,
        name: &str,
        explicit: Option<&str>,
        allow_protected: bool,
    ) -> Option<String> {
        self.resolve(class_name, name, explicit, allow_protected, true)
    }

    /// Resolves the storage key to write `name` into on `class_name`.
    pub fn resolve_set(
        &self,
        class_name: &str,
        name: &str,
        explicit: Option<&str>,
        allow_protected: bool,
    ) -> Option<String> {
        self.resolve(class_name, name, explicit, allow_protected, false)
    }

    fn resolve(
        &self,
        class_name: &str,
        name: &str,
        explicit: Option<&str>,
        allow_protected: bool,
        want_getter: bool,
    ) -> Option<String> {
        let entries = self.beans.get(class_name)?;

        let find = |key: &str, want_getter: bool| -> Option<&AccessorEntry> {
            entries.iter().find(|e| {
                e.key == key
                    && (e.visibility == Visibility::Public || allow_protected)
                    && if want_getter { e.getter } else { e.setter }
            })
        };

        // Step 1: explicit configured name, literal then prefix-stripped.
        if let Some(explicit) = explicit {
            if let Some(entry) = find(explicit, want_getter) {
                return Some(entry.key.clone());
            }
            if let Some(stripped) = strip_accessor_prefix(explicit) {
                if let Some(entry) = find(&stripped, want_getter) {
                    return Some(entry.key.clone());
                }
            }
        }

        // Step 2: conventional name variants.
        for candidate in name_variants(name) {
            if let Some(entry) = find(&candidate, want_getter) {
                return Some(entry.key.clone());
            }
        }

        // Step 4: a key was registered under one of the variants but only
        // for the opposite direction — still resolves to that key so the
        // caller can distinguish "found but wrong direction" from a true
        // miss.
        for candidate in name_variants(name) {
            if find(&candidate, !want_getter).is_some() {
                return Some(candidate);
            }
        }

        None
    }
}

impl Default for AccessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The four conventional key variants tried during name-based resolution, in
/// order.
fn name_variants(name: &str) -> [String; 4] {
    [
        capitalize(name),
        decapitalize(name),
        format!("_{name}"),
        format!("m_{name}"),
    ]
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

const ACCESSOR_PREFIXES: &[&str] = &["get", "Get", "is", "Is", "set", "Set"];

/// Strips a conventional accessor prefix from an explicitly configured
/// getter/setter name, decapitalizing the remainder (`GetName` -> `name`).
fn strip_accessor_prefix(explicit: &str) -> Option<String> {
    for prefix in ACCESSOR_PREFIXES {
        if let Some(rest) = explicit.strip_prefix(prefix) {
            if !rest.is_empty() {
                return Some(decapitalize(rest));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_conventional_variant() {
        let registry = AccessorRegistry::new();
        registry.register("Widget", "_name", true, true, Visibility::Public);
        assert_eq!(
            registry.resolve_get("Widget", "name", None, false),
            Some("_name".to_string())
        );
    }

    #[test]
    fn explicit_name_takes_priority_and_strips_prefix() {
        let registry = AccessorRegistry::new();
        registry.register("Widget", "name", true, false, Visibility::Public);
        assert_eq!(
            registry.resolve_get("Widget", "name", Some("GetName"), false),
            Some("name".to_string())
        );
    }

    #[test]
    fn restricted_accessor_hidden_unless_allowed() {
        let registry = AccessorRegistry::new();
        registry.register("Widget", "name", true, true, Visibility::Restricted);
        assert_eq!(registry.resolve_get("Widget", "name", None, false), None);
        assert_eq!(
            registry.resolve_get("Widget", "name", None, true),
            Some("name".to_string())
        );
    }

    #[test]
    fn unregistered_bean_resolves_to_none() {
        let registry = AccessorRegistry::new();
        assert_eq!(registry.resolve_get("Ghost", "name", None, true), None);
    }
}
