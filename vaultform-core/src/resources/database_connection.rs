//! Database secret backend connections at `<backend>/config/<name>`.
//!
//! A sub-resource: the identity joins the backend mount path and the
//! connection name with `/`. Reads come back with connection details nested
//! under `connection_details`.

use crate::client::JsonMap;
use crate::reconciler::{DeletePolicy, ReadStrategy, ResourceDef};
use crate::resources::copy_present;
use serde_json::Value as Json;
use vaultform_spec::codec::encode_str_set;
use vaultform_spec::pathing::{normalize_mount, sub_resource_path};
use vaultform_spec::{Error, FieldKind, FieldSpec, ResourceState, Result, Schema};

pub struct DatabaseConnection {
    schema: Schema,
}

impl DatabaseConnection {
    pub fn new() -> Self {
        let schema = Schema::new(vec![
            FieldSpec::required("backend", FieldKind::Str)
                .force_new()
                .suppress_trailing_slash(),
            FieldSpec::required("name", FieldKind::Str).force_new(),
            FieldSpec::required("plugin_name", FieldKind::Str),
            FieldSpec::optional("connection_url", FieldKind::Str).sensitive(),
            FieldSpec::optional_computed("allowed_roles", FieldKind::StrSet),
            FieldSpec::optional("verify_connection", FieldKind::Bool).with_default(true),
            FieldSpec::optional("root_rotation_statements", FieldKind::StrSet),
        ]);
        Self { schema }
    }
}

impl Default for DatabaseConnection {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a `<backend>/<name>` identity back into its parts. The name is the
/// final segment; the backend may itself contain separators.
fn split_identity(id: &str) -> Result<(&str, &str)> {
    id.rsplit_once('/')
        .filter(|(backend, name)| !backend.is_empty() && !name.is_empty())
        .ok_or_else(|| Error::validation("id", format!("expected <backend>/<name>, got {id:?}")))
}

impl ResourceDef for DatabaseConnection {
    fn kind(&self) -> &'static str {
        "database_connection"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn identity(&self, state: &ResourceState) -> Result<String> {
        let backend = state
            .str("backend")
            .ok_or(Error::MissingField { field: "backend" })?;
        let name = state
            .str("name")
            .ok_or(Error::MissingField { field: "name" })?;
        Ok(format!(
            "{}/{}",
            normalize_mount(backend),
            name.trim_matches('/')
        ))
    }

    fn remote_path(&self, id: &str) -> String {
        match split_identity(id) {
            Ok((backend, name)) => sub_resource_path(backend, "config", name),
            // An unsplittable identity still yields a deterministic address.
            Err(_) => format!("{}/config", normalize_mount(id)),
        }
    }

    fn read_strategy(&self) -> ReadStrategy {
        ReadStrategy::Direct
    }

    fn delete_policy(&self) -> DeletePolicy {
        DeletePolicy::Remove
    }

    fn encode(&self, state: &ResourceState) -> Result<JsonMap> {
        let mut data = JsonMap::new();
        if let Some(plugin) = state.str("plugin_name") {
            data.insert("plugin_name".into(), Json::String(plugin.to_string()));
        }
        if let Some(url) = state.str("connection_url") {
            data.insert("connection_url".into(), Json::String(url.to_string()));
        }
        if state.is_set("allowed_roles") {
            data.insert(
                "allowed_roles".into(),
                encode_str_set(state.str_set("allowed_roles")),
            );
        }
        if let Some(verify) = state.get("verify_connection").and_then(|v| v.as_bool()) {
            data.insert("verify_connection".into(), Json::Bool(verify));
        }
        if state.is_set("root_rotation_statements") {
            data.insert(
                "root_rotation_statements".into(),
                encode_str_set(state.str_set("root_rotation_statements")),
            );
        }
        Ok(data)
    }

    fn decode(&self, state: &mut ResourceState, payload: &JsonMap) -> Result<()> {
        if let Some(id) = state.id().map(str::to_string) {
            let (backend, name) = split_identity(&id)?;
            state.set("backend", backend.to_string());
            state.set("name", name.to_string());
        }
        copy_present(state, &self.schema, payload, "plugin_name", "plugin_name")?;
        copy_present(state, &self.schema, payload, "allowed_roles", "allowed_roles")?;
        copy_present(
            state,
            &self.schema,
            payload,
            "root_rotation_statements",
            "root_rotation_statements",
        )?;
        if let Some(Json::Object(details)) = payload.get("connection_details") {
            copy_present(state, &self.schema, details, "connection_url", "connection_url")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identity_joins_backend_and_name() {
        let def = DatabaseConnection::new();
        let state = ResourceState::new()
            .with("backend", "database/")
            .with("name", "mydb")
            .with("plugin_name", "postgresql-database-plugin");
        assert_eq!(def.identity(&state).unwrap(), "database/mydb");
        assert_eq!(def.remote_path("database/mydb"), "database/config/mydb");
    }

    #[test]
    fn nested_backend_paths_split_on_last_separator() {
        let def = DatabaseConnection::new();
        assert_eq!(
            def.remote_path("db/prod/replica"),
            "db/prod/config/replica"
        );
    }

    #[test]
    fn decode_lifts_nested_connection_details() {
        let def = DatabaseConnection::new();
        let mut state = ResourceState::new();
        state.set_id("database/mydb");
        let payload = json!({
            "plugin_name": "postgresql-database-plugin",
            "allowed_roles": ["app", "readonly"],
            "connection_details": {"connection_url": "postgres://{{username}}@db:5432"}
        });
        def.decode(&mut state, payload.as_object().unwrap()).unwrap();
        assert_eq!(state.str("backend"), Some("database"));
        assert_eq!(state.str("name"), Some("mydb"));
        assert_eq!(state.str_set("allowed_roles"), ["app", "readonly"]);
        assert_eq!(
            state.str("connection_url"),
            Some("postgres://{{username}}@db:5432")
        );
    }
}
