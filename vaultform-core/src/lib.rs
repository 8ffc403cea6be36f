//! Vault HTTP transport and resource reconcilers.
//!
//! Each resource type declares its field table and payload codec in
//! `resources`; the shared `Reconciler` engine runs the write/read/delete/
//! exists contract against an injected `VaultStore`. Construct the HTTP
//! store from `VaultConfig` and hand it to as many reconcilers as needed —
//! it carries no per-call mutable state.
//!
//! ```no_run
//! use vaultform_core::client::VaultConfig;
//! use vaultform_core::reconciler::Reconciler;
//! use vaultform_core::resources::AuthBackend;
//! use vaultform_spec::ResourceState;
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = VaultConfig::from_env()?.build_store()?;
//! let reconciler = Reconciler::new(AuthBackend::new());
//! let mut state = ResourceState::new()
//!     .with("type", "approle")
//!     .with("default_lease_ttl_seconds", 3600);
//! reconciler.write(&store, &mut state)?;
//! assert_eq!(state.id(), Some("approle"));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod reconciler;
pub mod resources;

pub use client::{HttpVaultStore, JsonMap, VaultConfig, VaultStore};
pub use reconciler::{DeletePolicy, ExistsOutcome, ReadStrategy, Reconciler, ResourceDef};
pub use resources::{AuthBackend, DatabaseConnection, GcpAuthConfig};
