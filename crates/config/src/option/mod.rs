//! Typed option descriptors.
//!
//! An [`OptionDef`] is a static declaration of one configuration key: its
//! section, name, type, raw default, documentation, and optionally the
//! dotted name of the component that owns it. Declarations are collected
//! into an [`OptionRegistry`] at link time through
//! [`inventory`] submissions:
//!
//! ```ignore
//! static LOG_LEVEL: OptionDef = OptionDef::choice(
//!     "logging", "level",
//!     &["info", "debug", "warn", "error"],
//!     "Verbosity of the deployment-unit log.",
//! );
//! inventory::submit!(OptionReg(&LOG_LEVEL));
//! ```
//!
//! Reads go through [`OptionDef::read`] against a
//! [`Configuration`](crate::store::Configuration) and yield an
//! [`OptionValue`]. There is no write path through a descriptor; mutation
//! goes through `Configuration::set` only.

mod def;
mod registry;
mod value;

pub use def::{OptionDef, OptionKind};
pub use registry::{OptionReg, OptionRegistry};
pub use value::{OptionValue, as_bool};

pub(crate) use def::split_and_trim;
