//! Schema, state, and codec types shared by the vaultform reconcilers.
//!
//! This crate is pure: it declares how resource fields are typed, validated,
//! normalized, and addressed, but performs no I/O. The transport client and
//! the reconciler engine live in `vaultform-core`.

pub mod codec;
pub mod error;
pub mod pathing;
pub mod schema;
pub mod state;
pub mod value;

pub use error::{Error, Result};
pub use schema::{DiffRule, FieldKind, FieldMode, FieldSpec, Schema, Validator};
pub use state::ResourceState;
pub use value::Value;

pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::schema::{DiffRule, FieldKind, FieldMode, FieldSpec, Schema};
    pub use crate::state::ResourceState;
    pub use crate::value::Value;
}
