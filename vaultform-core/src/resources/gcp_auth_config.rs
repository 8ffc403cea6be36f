//! GCP auth method configuration at `auth/<mount>/config`.
//!
//! The configuration object cannot be deleted independently of its mount;
//! destroying the resource resets it to server defaults by writing an empty
//! payload.

use crate::client::JsonMap;
use crate::reconciler::{DeletePolicy, ReadStrategy, ResourceDef};
use crate::resources::copy_present;
use serde_json::Value as Json;
use vaultform_spec::codec::{
    encode_metadata, normalize_credentials_json, validate_credentials_json, METADATA_DEFAULT,
};
use vaultform_spec::pathing::{auth_config_path, normalize_mount};
use vaultform_spec::{FieldKind, FieldSpec, ResourceState, Result, Schema};

const DEFAULT_MOUNT: &str = "gcp";

/// Metadata collections with their "use default" companion flags.
const METADATA_FIELDS: &[(&str, &str)] = &[
    ("iam_metadata", "default_iam_metadata"),
    ("gce_metadata", "default_gce_metadata"),
];

/// Credential attributes the server derives and reports back.
const COMPUTED_CREDENTIAL_FIELDS: &[&str] =
    &["client_id", "private_key_id", "project_id", "client_email"];

pub struct GcpAuthConfig {
    schema: Schema,
}

impl GcpAuthConfig {
    pub fn new() -> Self {
        let schema = Schema::new(vec![
            FieldSpec::optional("path", FieldKind::Str)
                .force_new()
                .with_default(DEFAULT_MOUNT)
                .suppress_trailing_slash(),
            FieldSpec::optional("credentials", FieldKind::Str)
                .sensitive()
                .validate_with(validate_credentials_json),
            FieldSpec::optional_computed("iam_alias", FieldKind::Str),
            FieldSpec::optional_computed("gce_alias", FieldKind::Str),
            FieldSpec::optional_computed("iam_metadata", FieldKind::StrSet),
            FieldSpec::optional("default_iam_metadata", FieldKind::Bool).with_default(true),
            FieldSpec::optional_computed("gce_metadata", FieldKind::StrSet),
            FieldSpec::optional("default_gce_metadata", FieldKind::Bool).with_default(true),
            FieldSpec::computed("client_id", FieldKind::Str),
            FieldSpec::computed("private_key_id", FieldKind::Str),
            FieldSpec::computed("project_id", FieldKind::Str),
            FieldSpec::computed("client_email", FieldKind::Str),
        ]);
        Self { schema }
    }

    fn default_flag(&self, state: &ResourceState, flag: &str) -> bool {
        self.schema
            .effective(state, flag)
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }
}

impl Default for GcpAuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDef for GcpAuthConfig {
    fn kind(&self) -> &'static str {
        "gcp_auth_config"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn identity(&self, state: &ResourceState) -> Result<String> {
        let mount = state.str("path").unwrap_or(DEFAULT_MOUNT);
        Ok(normalize_mount(mount))
    }

    fn remote_path(&self, id: &str) -> String {
        auth_config_path(id)
    }

    fn read_strategy(&self) -> ReadStrategy {
        ReadStrategy::Direct
    }

    fn delete_policy(&self) -> DeletePolicy {
        DeletePolicy::ResetToDefaults
    }

    fn encode(&self, state: &ResourceState) -> Result<JsonMap> {
        let mut data = JsonMap::new();
        if let Some(raw) = state.str("credentials") {
            let normalized = normalize_credentials_json("credentials", raw)?;
            data.insert("credentials".into(), Json::String(normalized));
        }
        if let Some(alias) = state.str("iam_alias") {
            data.insert("iam_alias".into(), Json::String(alias.to_string()));
        }
        if let Some(alias) = state.str("gce_alias") {
            data.insert("gce_alias".into(), Json::String(alias.to_string()));
        }
        for &(collection, flag) in METADATA_FIELDS {
            let use_default = self.default_flag(state, flag);
            data.insert(
                collection.into(),
                encode_metadata(use_default, state.str_set(collection)),
            );
        }
        Ok(data)
    }

    fn decode(&self, state: &mut ResourceState, payload: &JsonMap) -> Result<()> {
        if let Some(id) = state.id().map(str::to_string) {
            state.set("path", id);
        }
        if let Some(raw) = payload.get("credentials").and_then(Json::as_str) {
            let normalized = normalize_credentials_json("credentials", raw)?;
            state.set("credentials", normalized);
        }
        copy_present(state, &self.schema, payload, "iam_alias", "iam_alias")?;
        copy_present(state, &self.schema, payload, "gce_alias", "gce_alias")?;
        for &(collection, flag) in METADATA_FIELDS {
            match payload.get(collection) {
                // The store echoes the sentinel when defaults are in use;
                // reflect it in the flag rather than the collection.
                Some(Json::String(s)) if s == METADATA_DEFAULT => state.set(flag, true),
                Some(Json::Array(_)) => {
                    copy_present(state, &self.schema, payload, collection, collection)?
                }
                _ => {}
            }
        }
        for &field in COMPUTED_CREDENTIAL_FIELDS {
            copy_present(state, &self.schema, payload, field, field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_sentinel_applied_when_flag_defaults_true() {
        let def = GcpAuthConfig::new();
        let state = ResourceState::new().with("iam_metadata", vec!["foo=bar"]);
        let payload = def.encode(&state).unwrap();
        // Flag defaults to true, so the sentinel wins over the collection.
        assert_eq!(payload.get("iam_metadata"), Some(&json!("default")));
        assert_eq!(payload.get("gce_metadata"), Some(&json!("default")));
    }

    #[test]
    fn metadata_collection_sent_verbatim_when_flag_false() {
        let def = GcpAuthConfig::new();
        let state = ResourceState::new()
            .with("default_iam_metadata", false)
            .with("iam_metadata", vec!["foo=bar"]);
        let payload = def.encode(&state).unwrap();
        assert_eq!(payload.get("iam_metadata"), Some(&json!(["foo=bar"])));
    }

    #[test]
    fn credentials_are_normalized_before_sending() {
        let def = GcpAuthConfig::new();
        let state =
            ResourceState::new().with("credentials", r#"{ "b": 1, "a": "x" }"#);
        let payload = def.encode(&state).unwrap();
        assert_eq!(
            payload.get("credentials"),
            Some(&json!(r#"{"a":"x","b":1}"#))
        );
    }

    #[test]
    fn identity_uses_default_mount_and_trims() {
        let def = GcpAuthConfig::new();
        assert_eq!(def.identity(&ResourceState::new()).unwrap(), "gcp");
        let custom = ResourceState::new().with("path", "my-gcp/");
        assert_eq!(def.identity(&custom).unwrap(), "my-gcp");
        assert_eq!(def.remote_path("my-gcp"), "auth/my-gcp/config");
    }

    #[test]
    fn decode_reflects_sentinel_into_flag() {
        let def = GcpAuthConfig::new();
        let mut state = ResourceState::new();
        state.set_id("gcp");
        let payload = json!({
            "iam_metadata": "default",
            "gce_metadata": ["project_id"],
            "client_email": "svc@demo.iam"
        });
        def.decode(&mut state, payload.as_object().unwrap()).unwrap();
        assert!(state.bool_or("default_iam_metadata", false));
        assert_eq!(state.str_set("gce_metadata"), ["project_id"]);
        assert_eq!(state.str("client_email"), Some("svc@demo.iam"));
        assert!(!state.is_set("iam_alias"));
    }
}
