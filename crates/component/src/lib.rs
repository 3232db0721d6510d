//! Component framework for Girder.
//!
//! This crate provides the plugin backbone of the Girder scaffold: a
//! process-wide ledger of component definitions, a per-scope manager that
//! activates them lazily, and typed extension points that resolve the live,
//! enabled implementers of an interface.
//!
//! # Declaring a component
//!
//! Interfaces are ordinary object-safe traits (they must be `Send + Sync`).
//! A concrete type becomes a component through the [`component!`] macro,
//! which emits a static [`ComponentDef`], submits it for link-time
//! collection, and wires up the glue traits:
//!
//! ```ignore
//! pub trait ITaxProvider: Send + Sync {
//!     fn rate(&self) -> f64;
//! }
//!
//! struct FlatTax;
//!
//! impl FlatTax {
//!     fn new(_manager: &ComponentManager) -> Result<Self, BoxError> {
//!         Ok(FlatTax)
//!     }
//! }
//!
//! component! {
//!     FlatTax, "girder.tax.flat_tax",
//!     new = FlatTax::new,
//!     implements = [dyn ITaxProvider],
//! }
//! ```
//!
//! # Activation
//!
//! A [`ComponentManager`] owns at most one instance per component class.
//! Instances are created on first access, gated by an [`EnablementPolicy`],
//! and survive until the manager is dropped. Extension points recompute
//! their answer on every read, so enablement changes between reads are
//! observed immediately.

pub mod def;
pub mod error;
pub mod extension;
pub mod manager;
mod macros;
pub mod policy;
pub mod registry;

pub use def::{BoxError, Component, ComponentDef, ComponentReg, InterfaceBinding, RegisteredComponent};
pub use error::ComponentError;
pub use extension::ExtensionPoint;
pub use manager::{AmbientValues, ComponentManager, DefaultEnablement, EnablementPolicy};
pub use policy::PrefixRules;
pub use registry::{ComponentRegistry, Implementer};

#[doc(hidden)]
pub mod __private {
	pub use inventory;
	pub use paste::paste;
}
