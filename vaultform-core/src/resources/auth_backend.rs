//! Auth method mounts under the system backend.
//!
//! Enabled by writing an options payload to `sys/auth/<path>` and observed
//! through the `sys/auth` listing, where each mount appears under the key
//! `<path>/`.

use crate::client::JsonMap;
use crate::reconciler::{DeletePolicy, ReadStrategy, ResourceDef};
use crate::resources::copy_present;
use serde_json::Value as Json;
use vaultform_spec::codec::{encode_duration_seconds, encode_str_set};
use vaultform_spec::pathing::{auth_mount_path, normalize_mount};
use vaultform_spec::schema::reject_trailing_slash;
use vaultform_spec::{Error, FieldKind, FieldSpec, ResourceState, Result, Schema};

const LISTING_PATH: &str = "sys/auth";

/// Fields tuned through the mount's nested `config` object, paired with
/// their local attribute names.
const CONFIG_SET_FIELDS: &[(&str, &str)] = &[
    ("audit_non_hmac_request_keys", "audit_non_hmac_request_keys"),
    ("audit_non_hmac_response_keys", "audit_non_hmac_response_keys"),
    ("passthrough_request_headers", "passthrough_request_headers"),
    ("allowed_response_headers", "allowed_response_headers"),
];

pub struct AuthBackend {
    schema: Schema,
}

impl AuthBackend {
    pub fn new() -> Self {
        let schema = Schema::new(vec![
            FieldSpec::required("type", FieldKind::Str).force_new(),
            FieldSpec::optional_computed("path", FieldKind::Str)
                .force_new()
                .suppress_trailing_slash()
                .validate_with(reject_trailing_slash),
            FieldSpec::optional("description", FieldKind::Str),
            FieldSpec::optional_computed("default_lease_ttl_seconds", FieldKind::Int),
            FieldSpec::optional_computed("max_lease_ttl_seconds", FieldKind::Int),
            FieldSpec::optional_computed("audit_non_hmac_request_keys", FieldKind::StrSet),
            FieldSpec::optional_computed("audit_non_hmac_response_keys", FieldKind::StrSet),
            FieldSpec::optional("listing_visibility", FieldKind::Str),
            FieldSpec::optional_computed("passthrough_request_headers", FieldKind::StrSet),
            FieldSpec::optional_computed("allowed_response_headers", FieldKind::StrSet),
            FieldSpec::optional("local", FieldKind::Bool),
            FieldSpec::optional("seal_wrap", FieldKind::Bool),
            FieldSpec::computed("accessor", FieldKind::Str),
        ]);
        Self { schema }
    }
}

impl Default for AuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDef for AuthBackend {
    fn kind(&self) -> &'static str {
        "auth_backend"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The mount path, defaulting to the method type when not set.
    fn identity(&self, state: &ResourceState) -> Result<String> {
        let path = match state.str("path") {
            Some(path) if !path.is_empty() => path,
            _ => state
                .str("type")
                .ok_or(Error::MissingField { field: "type" })?,
        };
        Ok(normalize_mount(path))
    }

    fn remote_path(&self, id: &str) -> String {
        auth_mount_path(id)
    }

    fn read_strategy(&self) -> ReadStrategy {
        ReadStrategy::ListScan {
            listing_path: LISTING_PATH,
        }
    }

    fn delete_policy(&self) -> DeletePolicy {
        DeletePolicy::Remove
    }

    fn encode(&self, state: &ResourceState) -> Result<JsonMap> {
        let mut data = JsonMap::new();
        if let Some(mount_type) = state.str("type") {
            data.insert("type".into(), Json::String(mount_type.to_string()));
        }
        if let Some(description) = state.str("description") {
            data.insert("description".into(), Json::String(description.to_string()));
        }
        if let Some(local) = state.get("local").and_then(|v| v.as_bool()) {
            data.insert("local".into(), Json::Bool(local));
        }
        if let Some(seal_wrap) = state.get("seal_wrap").and_then(|v| v.as_bool()) {
            data.insert("seal_wrap".into(), Json::Bool(seal_wrap));
        }

        let mut config = JsonMap::new();
        if let Some(ttl) = state.int("default_lease_ttl_seconds") {
            config.insert(
                "default_lease_ttl".into(),
                Json::String(encode_duration_seconds(ttl)),
            );
        }
        if let Some(ttl) = state.int("max_lease_ttl_seconds") {
            config.insert(
                "max_lease_ttl".into(),
                Json::String(encode_duration_seconds(ttl)),
            );
        }
        if let Some(visibility) = state.str("listing_visibility") {
            config.insert(
                "listing_visibility".into(),
                Json::String(visibility.to_string()),
            );
        }
        for &(remote, local) in CONFIG_SET_FIELDS {
            if state.is_set(local) {
                config.insert(remote.into(), encode_str_set(state.str_set(local)));
            }
        }
        if !config.is_empty() {
            data.insert("config".into(), Json::Object(config));
        }
        Ok(data)
    }

    fn decode(&self, state: &mut ResourceState, payload: &JsonMap) -> Result<()> {
        if let Some(id) = state.id().map(str::to_string) {
            state.set("path", id);
        }
        copy_present(state, &self.schema, payload, "type", "type")?;
        copy_present(state, &self.schema, payload, "description", "description")?;
        copy_present(state, &self.schema, payload, "accessor", "accessor")?;
        copy_present(state, &self.schema, payload, "local", "local")?;
        copy_present(state, &self.schema, payload, "seal_wrap", "seal_wrap")?;

        if let Some(Json::Object(config)) = payload.get("config") {
            copy_present(
                state,
                &self.schema,
                config,
                "default_lease_ttl",
                "default_lease_ttl_seconds",
            )?;
            copy_present(
                state,
                &self.schema,
                config,
                "max_lease_ttl",
                "max_lease_ttl_seconds",
            )?;
            copy_present(
                state,
                &self.schema,
                config,
                "listing_visibility",
                "listing_visibility",
            )?;
            for &(remote, local) in CONFIG_SET_FIELDS {
                copy_present(state, &self.schema, config, remote, local)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_optional_fields_are_omitted_from_payload() {
        let def = AuthBackend::new();
        let state = ResourceState::new().with("type", "approle");
        let payload = def.encode(&state).unwrap();
        assert_eq!(payload.get("type"), Some(&json!("approle")));
        assert!(!payload.contains_key("description"));
        assert!(!payload.contains_key("config"));
        assert!(!payload.contains_key("local"));
    }

    #[test]
    fn lease_ttls_encode_as_duration_strings() {
        let def = AuthBackend::new();
        let state = ResourceState::new()
            .with("type", "approle")
            .with("default_lease_ttl_seconds", 3600)
            .with("max_lease_ttl_seconds", 7200);
        let payload = def.encode(&state).unwrap();
        let config = payload.get("config").and_then(|c| c.as_object()).unwrap();
        assert_eq!(config.get("default_lease_ttl"), Some(&json!("3600s")));
        assert_eq!(config.get("max_lease_ttl"), Some(&json!("7200s")));
    }

    #[test]
    fn identity_falls_back_to_type_and_trims_separators() {
        let def = AuthBackend::new();
        let by_type = ResourceState::new().with("type", "approle");
        assert_eq!(def.identity(&by_type).unwrap(), "approle");

        let by_path = ResourceState::new()
            .with("type", "approle")
            .with("path", "/custom/");
        assert_eq!(def.identity(&by_path).unwrap(), "custom");
    }

    #[test]
    fn decode_copies_present_fields_and_skips_missing() {
        let def = AuthBackend::new();
        let mut state = ResourceState::new();
        state.set_id("approle");
        let entry = json!({
            "type": "approle",
            "accessor": "auth_approle_1a2b",
            "local": false,
            "config": {"default_lease_ttl": 3600, "listing_visibility": "unauth"}
        });
        def.decode(&mut state, entry.as_object().unwrap()).unwrap();
        assert_eq!(state.str("type"), Some("approle"));
        assert_eq!(state.str("path"), Some("approle"));
        assert_eq!(state.str("accessor"), Some("auth_approle_1a2b"));
        assert_eq!(state.int("default_lease_ttl_seconds"), Some(3600));
        assert_eq!(state.str("listing_visibility"), Some("unauth"));
        // Description was absent from the listing and stays unset.
        assert!(!state.is_set("description"));
    }
}
