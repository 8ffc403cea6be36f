//! The shared four-operation reconciliation engine.
//!
//! Every resource type implements `ResourceDef` (field table, identity,
//! addressing, payload codec, policies); the engine runs the same
//! write/read/delete/exists contract for all of them against an explicitly
//! injected `VaultStore`.

use crate::client::{JsonMap, VaultStore};
use tracing::{debug, warn};
use vaultform_spec::pathing::listing_key;
use vaultform_spec::{Error, ResourceState, Result, Schema};

/// How the remote object is located during a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Read directly at the resource's remote path.
    Direct,
    /// Scan a list-style endpoint for the entry keyed `<id>/`.
    ListScan { listing_path: &'static str },
}

/// How the resource is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Issue a remove/disable call at the remote path.
    Remove,
    /// The object cannot be deleted independently of its parent mount;
    /// write an empty payload to reset it to server defaults.
    ResetToDefaults,
}

/// Presence judgment from an existence check.
///
/// When the check itself fails the judgment is `present: true` alongside the
/// error: assuming presence during an outage avoids destructive re-creation.
/// The bias can mask a genuine deletion until the store is reachable again,
/// at which point the next read clears the identity.
#[derive(Debug)]
pub struct ExistsOutcome {
    pub present: bool,
    pub error: Option<Error>,
}

/// One resource type: its declared fields, identity derivation, remote
/// addressing, and payload codec.
pub trait ResourceDef {
    /// Short name used in log events.
    fn kind(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    /// Derive the stable identity from desired state. Never contains a
    /// trailing separator.
    fn identity(&self, state: &ResourceState) -> Result<String>;

    /// Canonical remote address for an identity.
    fn remote_path(&self, id: &str) -> String;

    fn read_strategy(&self) -> ReadStrategy {
        ReadStrategy::Direct
    }

    fn delete_policy(&self) -> DeletePolicy {
        DeletePolicy::Remove
    }

    /// Assemble the write payload from desired state. Unset optional fields
    /// must be omitted so server defaults are not clobbered.
    fn encode(&self, state: &ResourceState) -> Result<JsonMap>;

    /// Copy schema fields present in the remote payload into local state,
    /// silently skipping fields the payload omits.
    fn decode(&self, state: &mut ResourceState, payload: &JsonMap) -> Result<()>;
}

/// Engine binding a resource definition to the four-operation contract.
pub struct Reconciler<R: ResourceDef> {
    def: R,
}

impl<R: ResourceDef> Reconciler<R> {
    pub fn new(def: R) -> Self {
        Self { def }
    }

    pub fn def(&self) -> &R {
        &self.def
    }

    /// Write desired state to the store, then read it back.
    ///
    /// Validation runs before any remote call. On transport failure the
    /// identity is cleared: a failed write must not leave local state
    /// pointing at an object that was never confirmed to exist. The write is
    /// complete only once the read-back has populated computed fields.
    pub fn write(&self, store: &dyn VaultStore, state: &mut ResourceState) -> Result<()> {
        self.def.schema().validate(state)?;

        let id = self.def.identity(state)?;
        let path = self.def.remote_path(&id);
        let payload = self.def.encode(state)?;

        debug!(kind = self.def.kind(), %path, "writing resource");
        if let Err(err) = store.write(&path, &payload) {
            state.clear_id();
            return Err(err);
        }
        state.set_id(id);

        self.read(store, state)
    }

    /// Reconcile local state with what the store reports.
    ///
    /// Found: copy present fields. Absent: clear the identity and return
    /// success. Transport failure: propagate, leaving state unchanged.
    pub fn read(&self, store: &dyn VaultStore, state: &mut ResourceState) -> Result<()> {
        let Some(id) = state.id().map(str::to_string) else {
            return Ok(());
        };

        match self.fetch(store, &id)? {
            Some(payload) => self.def.decode(state, &payload),
            None => {
                warn!(
                    kind = self.def.kind(),
                    %id,
                    "remote object not found, clearing local state"
                );
                state.clear_id();
                Ok(())
            }
        }
    }

    /// Destroy or reset the remote object. Idempotent: deleting an object
    /// that is already gone succeeds.
    pub fn delete(&self, store: &dyn VaultStore, state: &ResourceState) -> Result<()> {
        let Some(id) = state.id() else {
            return Ok(());
        };
        let path = self.def.remote_path(id);

        debug!(kind = self.def.kind(), %path, "deleting resource");
        match self.def.delete_policy() {
            DeletePolicy::Remove => store.delete(&path),
            DeletePolicy::ResetToDefaults => store.write(&path, &JsonMap::new()).map(|_| ()),
        }
    }

    /// Check whether the remote object exists.
    ///
    /// A failed call still reports `present: true` so the caller does not
    /// treat an outage as evidence of deletion.
    pub fn exists(&self, store: &dyn VaultStore, state: &ResourceState) -> ExistsOutcome {
        let Some(id) = state.id() else {
            return ExistsOutcome {
                present: false,
                error: None,
            };
        };

        match self.fetch(store, id) {
            Ok(found) => ExistsOutcome {
                present: found.is_some(),
                error: None,
            },
            Err(err) => ExistsOutcome {
                present: true,
                error: Some(err),
            },
        }
    }

    /// Locate the remote payload for an identity using the resource's read
    /// strategy.
    fn fetch(&self, store: &dyn VaultStore, id: &str) -> Result<Option<JsonMap>> {
        match self.def.read_strategy() {
            ReadStrategy::Direct => store.read(&self.def.remote_path(id)),
            ReadStrategy::ListScan { listing_path } => {
                let Some(listing) = store.read(listing_path)? else {
                    return Ok(None);
                };
                // List entries are keyed with a trailing separator.
                let key = listing_key(id);
                match listing.get(&key) {
                    Some(serde_json::Value::Object(entry)) => Ok(Some(entry.clone())),
                    Some(other) => Err(Error::decode(
                        listing_path,
                        format!("entry {key} is not an object: {other}"),
                    )),
                    None => Ok(None),
                }
            }
        }
    }
}
