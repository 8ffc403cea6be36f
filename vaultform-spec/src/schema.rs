//! Declarative field tables.
//!
//! Each resource declares its accepted fields as data: name, kind, mode,
//! default, whether a change forces recreation, a diff-suppression rule, and
//! an optional validator. A generic validation pass consumes the table; no
//! per-field code is hand-written in the reconcilers.

use crate::error::{Error, Result};
use crate::state::ResourceState;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Bool,
    StrSet,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Str => "string",
            FieldKind::Int => "integer",
            FieldKind::Bool => "boolean",
            FieldKind::StrSet => "string set",
        }
    }
}

/// How a field participates in reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    Required,
    Optional,
    /// Server-assigned, read-only for the caller.
    Computed,
    /// Caller may set it, and the server fills it in when unset.
    OptionalComputed,
}

/// Rule deciding when a local/remote discrepancy is immaterial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffRule {
    Exact,
    /// `"foo"` and `"foo/"` address the same object.
    TrailingSlash,
}

impl DiffRule {
    pub fn suppresses(self, old: &str, new: &str) -> bool {
        match self {
            DiffRule::Exact => old == new,
            DiffRule::TrailingSlash => {
                old == new || format!("{old}/") == new || format!("{new}/") == old
            }
        }
    }
}

pub type Validator = fn(&'static str, &Value) -> Result<()>;

/// One row of a resource's field table.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub mode: FieldMode,
    pub default: Option<Value>,
    pub force_new: bool,
    pub sensitive: bool,
    pub diff_rule: DiffRule,
    pub validator: Option<Validator>,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind, mode: FieldMode) -> Self {
        Self {
            name,
            kind,
            mode,
            default: None,
            force_new: false,
            sensitive: false,
            diff_rule: DiffRule::Exact,
            validator: None,
        }
    }

    pub fn required(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldMode::Required)
    }

    pub fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldMode::Optional)
    }

    pub fn computed(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldMode::Computed)
    }

    pub fn optional_computed(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldMode::OptionalComputed)
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn suppress_trailing_slash(mut self) -> Self {
        self.diff_rule = DiffRule::TrailingSlash;
        self
    }

    pub fn validate_with(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn is_computed_only(&self) -> bool {
        self.mode == FieldMode::Computed
    }
}

/// Ordered field table for one resource type.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    /// Resolve a field's effective value: the explicitly set value, or the
    /// declared default.
    pub fn effective<'a>(&'a self, state: &'a ResourceState, name: &str) -> Option<&'a Value> {
        state
            .get(name)
            .or_else(|| self.field(name).and_then(|f| f.default.as_ref()))
    }

    /// Validate desired state against the table before any remote call:
    /// required fields present, kinds match, per-field validators pass.
    ///
    /// Computed-only fields may be present (a prior read-back sets them);
    /// they are never encoded into a write payload, so they are checked for
    /// kind but not rejected.
    pub fn validate(&self, state: &ResourceState) -> Result<()> {
        for spec in &self.fields {
            match state.get(spec.name) {
                None => {
                    if spec.mode == FieldMode::Required {
                        return Err(Error::MissingField { field: spec.name });
                    }
                }
                Some(value) => {
                    if value.kind() != spec.kind {
                        return Err(Error::WrongKind {
                            field: spec.name,
                            expected: spec.kind.name(),
                        });
                    }
                    if let Some(validator) = spec.validator {
                        validator(spec.name, value)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether a local/remote discrepancy on `name` should be reported as a
    /// pending change.
    pub fn suppresses_diff(&self, name: &str, old: &str, new: &str) -> bool {
        self.field(name)
            .map(|f| f.diff_rule.suppresses(old, new))
            .unwrap_or(old == new)
    }
}

/// Validator rejecting values that end in a path separator.
pub fn reject_trailing_slash(field: &'static str, value: &Value) -> Result<()> {
    match value.as_str() {
        Some(v) if v.ends_with('/') => Err(Error::validation(
            field,
            "cannot write to a path ending in '/'",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Schema {
        Schema::new(vec![
            FieldSpec::required("type", FieldKind::Str).force_new(),
            FieldSpec::optional_computed("path", FieldKind::Str)
                .force_new()
                .suppress_trailing_slash()
                .validate_with(reject_trailing_slash),
            FieldSpec::optional("local", FieldKind::Bool),
            FieldSpec::computed("accessor", FieldKind::Str),
            FieldSpec::optional("default_iam_metadata", FieldKind::Bool).with_default(true),
        ])
    }

    #[test]
    fn required_field_must_be_present() {
        let schema = table();
        let state = ResourceState::new();
        assert_eq!(
            schema.validate(&state).unwrap_err(),
            Error::MissingField { field: "type" }
        );
    }

    #[test]
    fn kind_mismatch_rejected() {
        let schema = table();
        let mut state = ResourceState::new();
        state.set("type", "approle");
        state.set("local", "yes");
        assert!(matches!(
            schema.validate(&state).unwrap_err(),
            Error::WrongKind { field: "local", .. }
        ));
    }

    #[test]
    fn computed_fields_from_read_back_are_tolerated() {
        let schema = table();
        let mut state = ResourceState::new();
        state.set("type", "approle");
        state.set("accessor", "auth_approle_1234");
        assert!(schema.validate(&state).is_ok());
    }

    #[test]
    fn trailing_slash_suppression_is_symmetric() {
        let schema = table();
        assert!(schema.suppresses_diff("path", "approle", "approle/"));
        assert!(schema.suppresses_diff("path", "approle/", "approle"));
        assert!(!schema.suppresses_diff("path", "approle", "other"));
        // Fields without a rule compare exactly.
        assert!(!schema.suppresses_diff("type", "a", "a/"));
    }

    #[test]
    fn path_validator_rejects_trailing_slash() {
        let schema = table();
        let mut state = ResourceState::new();
        state.set("type", "approle");
        state.set("path", "approle/");
        assert!(matches!(
            schema.validate(&state).unwrap_err(),
            Error::Validation { field: "path", .. }
        ));
    }

    #[test]
    fn defaults_resolve_through_effective() {
        let schema = table();
        let mut state = ResourceState::new();
        assert_eq!(
            schema.effective(&state, "default_iam_metadata"),
            Some(&Value::Bool(true))
        );
        state.set("default_iam_metadata", false);
        assert_eq!(
            schema.effective(&state, "default_iam_metadata"),
            Some(&Value::Bool(false))
        );
    }
}
