//! Concrete resource definitions driven by the shared reconciler.

pub mod auth_backend;
pub mod database_connection;
pub mod gcp_auth_config;

pub use auth_backend::AuthBackend;
pub use database_connection::DatabaseConnection;
pub use gcp_auth_config::GcpAuthConfig;

use crate::client::JsonMap;
use vaultform_spec::{ResourceState, Result, Schema, Value};

/// Copy one schema field out of a remote payload when present.
///
/// Omitted and null fields are skipped without error: remote stores are free
/// to return partial payloads. A present field that cannot be converted to
/// the declared kind is a decode failure.
pub(crate) fn copy_present(
    state: &mut ResourceState,
    schema: &Schema,
    payload: &JsonMap,
    remote_key: &str,
    local: &'static str,
) -> Result<()> {
    let Some(json) = payload.get(remote_key) else {
        return Ok(());
    };
    if json.is_null() {
        return Ok(());
    }
    let Some(spec) = schema.field(local) else {
        return Ok(());
    };
    let value = Value::from_json(local, spec.kind, json)?;
    state.set(local, value);
    Ok(())
}
