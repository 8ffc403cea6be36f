//! The single local record reconciled after every operation.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Local resource state: a stable identity plus the attribute map.
///
/// The identity never carries a trailing separator. It is set by a
/// successful write, and cleared either when a read discovers the remote
/// object is gone or when a write fails before the object was confirmed to
/// exist. Serializable so the surrounding orchestration framework can
/// persist it between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    id: Option<String>,
    attrs: BTreeMap<String, Value>,
}

impl ResourceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for constructing desired state.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn unset(&mut self, name: &str) {
        self.attrs.remove(name);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn str_set(&self, name: &str) -> &[String] {
        self.get(name).and_then(Value::as_set).unwrap_or(&[])
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Destroy the local identity: the remote object no longer exists (or
    /// was never confirmed to).
    pub fn clear_id(&mut self) {
        self.id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors() {
        let state = ResourceState::new()
            .with("type", "approle")
            .with("default_lease_ttl_seconds", 3600)
            .with("local", true)
            .with("keys", vec!["a", "b"]);

        assert_eq!(state.str("type"), Some("approle"));
        assert_eq!(state.int("default_lease_ttl_seconds"), Some(3600));
        assert!(state.bool_or("local", false));
        assert!(!state.bool_or("seal_wrap", false));
        assert_eq!(state.str_set("keys"), ["a", "b"]);
        assert!(state.str_set("missing").is_empty());
    }

    #[test]
    fn identity_lifecycle() {
        let mut state = ResourceState::new();
        assert_eq!(state.id(), None);
        state.set_id("approle");
        assert_eq!(state.id(), Some("approle"));
        state.clear_id();
        assert_eq!(state.id(), None);
    }
}
